use clap::{Parser, Subcommand};
use icu_core::{
    config,
    models::{
        NewDoctorDetail, NewNurseDetail, NewUser, Role, RowId, Shift, Specialization, StaffView,
        User, UserUpdate,
    },
    CoreConfig, Services,
};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "icu")]
#[command(about = "ICU management admin console")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Account fields shared by the user-creating commands.
#[derive(clap::Args)]
struct AccountArgs {
    username: String,
    password: String,
    #[arg(long, default_value = "")]
    first_name: String,
    #[arg(long, default_value = "")]
    last_name: String,
    #[arg(long, default_value = "")]
    email: String,
    /// Hospital employee id (optional, unique when set)
    #[arg(long)]
    employee_id: Option<String>,
}

impl AccountArgs {
    fn into_new_user(self, role: Option<Role>) -> NewUser {
        NewUser {
            username: self.username,
            password: self.password,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            role,
            employee_id: self.employee_id,
            ..Default::default()
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create a user with any role
    CreateUser {
        #[command(flatten)]
        account: AccountArgs,
        /// ADMIN, DOCTOR or NURSE
        #[arg(long, default_value = "ADMIN")]
        role: Role,
    },
    /// Create a user with role DOCTOR
    CreateDoctor {
        #[command(flatten)]
        account: AccountArgs,
    },
    /// Create a user with role NURSE
    CreateNurse {
        #[command(flatten)]
        account: AccountArgs,
    },
    /// Attach or replace a doctor's details
    SetDoctorDetail {
        user_id: RowId,
        /// e.g. CRITICAL_CARE, cardiology
        specialization: Specialization,
        department: String,
        license_number: String,
        #[arg(long, default_value = "")]
        certifications: String,
    },
    /// Attach or replace a nurse's details
    SetNurseDetail {
        user_id: RowId,
        department: String,
        /// MORNING, AFTERNOON or NIGHT
        shift: Shift,
        license_number: String,
        #[arg(long, default_value = "")]
        certifications: String,
    },
    /// List doctors
    ListDoctors,
    /// List nurses
    ListNurses,
    /// List patients, most recent admission first
    ListPatients,
    /// List alerts, newest first
    ListAlerts {
        /// Only alerts that are not yet acknowledged
        #[arg(long)]
        open: bool,
    },
    /// Acknowledge alerts on behalf of a user
    AcknowledgeAlerts {
        acknowledged_by: RowId,
        #[arg(required = true)]
        alert_ids: Vec<RowId>,
    },
    /// Change a user's role. A doctor or nurse detail that no longer matches is removed
    SetRole {
        user_id: RowId,
        /// ADMIN, DOCTOR or NURSE
        role: Role,
    },
    /// Mark a user inactive; inactive users cannot log in
    DeactivateUser { user_id: RowId },
    /// Delete a user. Records that referenced them keep existing with the reference cleared
    DeleteUser { user_id: RowId },
}

fn open_services() -> Result<Services, Box<dyn std::error::Error>> {
    let storage = config::storage_from_env_value(std::env::var("ICU_DATA_DIR").ok());
    let params =
        config::password_params_from_env_value(std::env::var("ICU_ARGON2_PARAMS").ok())?;
    Ok(Services::open(Arc::new(CoreConfig::new(storage, params)))?)
}

fn print_users(users: &[User], empty: &str) {
    if users.is_empty() {
        println!("{}", empty);
        return;
    }
    for user in users {
        println!(
            "ID: {}, Username: {}, Name: {}, Employee: {}, Active: {}",
            user.id,
            user.username,
            user.full_name(),
            user.employee_id.as_deref().unwrap_or("-"),
            user.is_active
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'icu --help' for commands");
        return Ok(());
    };
    let services = open_services()?;

    match command {
        Commands::CreateUser { account, role } => {
            match services.staff.create_user(account.into_new_user(Some(role))) {
                Ok(user) => println!("Created user {} with ID: {}", user, user.id),
                Err(e) => eprintln!("Error creating user: {}", e),
            }
        }
        Commands::CreateDoctor { account } => {
            match services
                .staff
                .create_in_view(StaffView::Doctors, account.into_new_user(None))
            {
                Ok(user) => println!("Created doctor {} with ID: {}", user.username, user.id),
                Err(e) => eprintln!("Error creating doctor: {}", e),
            }
        }
        Commands::CreateNurse { account } => {
            match services
                .staff
                .create_in_view(StaffView::Nurses, account.into_new_user(None))
            {
                Ok(user) => println!("Created nurse {} with ID: {}", user.username, user.id),
                Err(e) => eprintln!("Error creating nurse: {}", e),
            }
        }
        Commands::SetDoctorDetail {
            user_id,
            specialization,
            department,
            license_number,
            certifications,
        } => {
            let req = NewDoctorDetail {
                specialization,
                department,
                license_number,
                certifications,
            };
            match services.staff.set_doctor_detail(user_id, req) {
                Ok(detail) => println!(
                    "Doctor {}: {} in {}",
                    user_id,
                    detail.specialization.label(),
                    detail.department
                ),
                Err(e) => eprintln!("Error setting doctor details: {}", e),
            }
        }
        Commands::SetNurseDetail {
            user_id,
            department,
            shift,
            license_number,
            certifications,
        } => {
            let req = NewNurseDetail {
                department,
                shift,
                license_number,
                certifications,
            };
            match services.staff.set_nurse_detail(user_id, req) {
                Ok(detail) => println!(
                    "Nurse {}: {} shift in {}",
                    user_id,
                    detail.shift.label(),
                    detail.department
                ),
                Err(e) => eprintln!("Error setting nurse details: {}", e),
            }
        }
        Commands::ListDoctors => {
            print_users(&services.staff.list_view(StaffView::Doctors)?, "No doctors found.")
        }
        Commands::ListNurses => {
            print_users(&services.staff.list_view(StaffView::Nurses)?, "No nurses found.")
        }
        Commands::ListPatients => {
            let patients = services.patients.list()?;
            if patients.is_empty() {
                println!("No patients found.");
            }
            for patient in patients {
                println!(
                    "ID: {}, {}: {}, Admitted: {}",
                    patient.id, patient.patient_id, patient, patient.admission_date
                );
            }
        }
        Commands::ListAlerts { open } => {
            let alerts = services.alerts.list(open.then_some(false))?;
            if alerts.is_empty() {
                println!("No alerts found.");
            }
            for alert in alerts {
                let state = if alert.acknowledged { "acknowledged" } else { "open" };
                println!(
                    "ID: {}, {} [{}] {}: {} ({})",
                    alert.id,
                    alert.alert_id,
                    alert.severity.label(),
                    alert.title,
                    alert.message,
                    state
                );
            }
        }
        Commands::AcknowledgeAlerts {
            acknowledged_by,
            alert_ids,
        } => match services.alerts.acknowledge(&alert_ids, acknowledged_by) {
            Ok(alerts) => println!("Acknowledged {} alert(s)", alerts.len()),
            Err(e) => eprintln!("Error acknowledging alerts: {}", e),
        },
        Commands::SetRole { user_id, role } => {
            let update = UserUpdate {
                role: Some(role),
                ..Default::default()
            };
            match services.staff.update_user(user_id, update) {
                Ok(user) => println!("{} is now {}", user.username, user.role.label()),
                Err(e) => eprintln!("Error changing role: {}", e),
            }
        }
        Commands::DeactivateUser { user_id } => {
            match services.staff.set_active(user_id, false) {
                Ok(user) => println!("Deactivated {}", user),
                Err(e) => eprintln!("Error deactivating user: {}", e),
            }
        }
        Commands::DeleteUser { user_id } => match services.staff.delete_user(user_id) {
            Ok(user) => println!("Deleted {}", user),
            Err(e) => eprintln!("Error deleting user: {}", e),
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn codes_parse_from_arguments() {
        let cli = Cli::parse_from([
            "icu",
            "set-nurse-detail",
            "3",
            "ICU",
            "night",
            "RN-1",
        ]);
        match cli.command {
            Some(Commands::SetNurseDetail { user_id, shift, .. }) => {
                assert_eq!(user_id, 3);
                assert_eq!(shift, Shift::Night);
            }
            _ => panic!("expected set-nurse-detail"),
        }

        let cli = Cli::parse_from(["icu", "create-user", "root", "pw", "--role", "doctor"]);
        assert!(matches!(
            cli.command,
            Some(Commands::CreateUser { role: Role::Doctor, .. })
        ));

        let cli = Cli::parse_from(["icu", "set-role", "7", "nurse"]);
        assert!(matches!(
            cli.command,
            Some(Commands::SetRole { user_id: 7, role: Role::Nurse })
        ));
    }
}
