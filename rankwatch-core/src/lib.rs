pub mod check;
pub mod credentials;
pub mod data;
pub mod error;
pub mod interpret;
pub mod model;
pub mod report;
pub mod session;
pub mod store;

use colored::Colorize;

pub use check::{
    CheckEvent, CheckOptions, CheckProgressCallback, CheckSummary, RankChecker, RotationCursor,
    execute_check,
};
pub use credentials::{CredentialSet, CredentialSource, SharedCredentials, mask_for_display};
pub use error::{CoreError, Result};
pub use interpret::{RankReading, extract_rank, extract_url};
pub use model::{KeywordResult, KeywordStatus, NewProject, Project, parse_keywords};
pub use session::{Session, View};
pub use store::ProjectStore;

const BANNER: &str = r#"
                 _                    _       _
 _ __ __ _ _ __ | | ____      ____ _| |_ ___| |__
| '__/ _` | '_ \| |/ /\ \ /\ / / _` | __/ __| '_ \
| | | (_| | | | |   <  \ V  V / (_| | || (__| | | |
|_|  \__,_|_| |_|_|\_\  \_/\_/ \__,_|\__\___|_| |_|
"#;

pub fn print_banner() {
    println!("{}", BANNER.bright_cyan().bold());
    println!(
        "  {} {}\n",
        "keyword rank checker".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
