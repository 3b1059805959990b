//! The user's profile: account details, usage statistics, password changes,
//! data export and account deletion.

mod account;
mod details;
mod export;
mod password;
mod stats;

pub use account::{AccountState, delete_account};
pub use details::{ProfileData, ProfileResponse, ProfileState, get_profile, update_profile_endpoint};
pub use export::{ExportData, ExportState, export_file_name, export_transactions, write_transactions_csv};
pub use password::{ChangePasswordData, PasswordState, change_password};
pub use stats::{ProfileStats, compute_profile_stats, get_profile_stats, load_profile_stats};
