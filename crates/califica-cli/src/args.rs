//! Command-line grammar. Every page of the client is a subcommand; the admin
//! pages live under `califica admin`.

use std::num::NonZeroUsize;

use clap::{value_parser, Args, Parser, Subcommand};

use califica_core::listing::ListQuery;
use califica_core::models::UserRole;
use califica_core::routes::Route;

#[derive(Parser, Debug)]
#[command(name = "califica", version, about = "Browse and rate professors")]
#[command(after_help = "Set CALIFICA_LOG_FILE=1 to also log to a file in the data directory.\n\
RUST_LOG controls the log filter, e.g. RUST_LOG=califica_core=debug.")]
pub struct Cli {
    /// API base URL (default http://localhost:3000/api)
    #[arg(long, global = true, env = "CALIFICA_API_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in (the password is prompted)
    Login { email: Option<String> },
    /// Create an account
    Signup,
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Confirm your email address
    Verify { token: String },
    /// Send the verification email again
    ResendVerification { email: String },

    /// List professors
    Professors(ProfessorFilter),
    /// Professor details and ratings
    Professor { id: String },
    /// Rate a professor
    Rate {
        professor_id: String,
        #[arg(value_parser = value_parser!(u8).range(1..=5))]
        rating: u8,
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// List universities
    Universities(ListArgs),
    /// University details and its professors
    University { id: String },

    /// Your account and activity
    Profile,
    /// Your ratings
    MyComments,
    /// Change one of your ratings
    EditComment {
        id: String,
        /// 0 leaves the rating unchanged
        #[arg(long, value_parser = value_parser!(u8).range(0..=5))]
        rating: Option<u8>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Delete one of your ratings
    DeleteComment { id: String },
    /// Account settings
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Administration (admin role only)
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    Name {
        #[arg(required = true)]
        name: Vec<String>,
    },
    Email { email: String },
    /// Change your password (prompted)
    Password,
    /// Permanently delete your account
    Delete,
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// Platform totals
    Stats,
    /// Look up a user by id or email
    Users { query: String },
    EditUser {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, value_parser = parse_role)]
        role: Option<UserRole>,
        #[arg(long)]
        password: Option<String>,
    },
    DeleteUser { id: String },

    Professors(ListArgs),
    AddProfessor {
        university_id: String,
        department: String,
        #[arg(required = true)]
        name: Vec<String>,
    },
    EditProfessor {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        university: Option<String>,
    },
    /// Delete a professor and their comments
    DeleteProfessor { id: String },

    Universities(ListArgs),
    AddUniversity {
        country: String,
        city: String,
        #[arg(required = true)]
        name: Vec<String>,
    },
    EditUniversity {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        city: Option<String>,
    },
    DeleteUniversity { id: String },

    Comments(ListArgs),
    DeleteComment { id: String },
}

impl AdminCommand {
    /// The admin page this command belongs to.
    pub fn route(&self) -> Route {
        match self {
            AdminCommand::Stats => Route::Admin,
            AdminCommand::Users { .. } | AdminCommand::EditUser { .. } | AdminCommand::DeleteUser { .. } => {
                Route::AdminUsers
            }
            AdminCommand::Professors(_)
            | AdminCommand::AddProfessor { .. }
            | AdminCommand::EditProfessor { .. }
            | AdminCommand::DeleteProfessor { .. } => Route::AdminProfessors,
            AdminCommand::Universities(_)
            | AdminCommand::AddUniversity { .. }
            | AdminCommand::EditUniversity { .. }
            | AdminCommand::DeleteUniversity { .. } => Route::AdminUniversities,
            AdminCommand::Comments(_) | AdminCommand::DeleteComment { .. } => Route::AdminComments,
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ListArgs {
    /// Case-insensitive text search
    #[arg(long)]
    pub search: Option<String>,

    #[arg(long, default_value_t = NonZeroUsize::MIN)]
    pub page: NonZeroUsize,
}

impl ListArgs {
    pub fn query(&self) -> ListQuery {
        let mut query = ListQuery::new();
        if let Some(search) = &self.search {
            query.set_search(search.as_str());
        }
        query.set_page(self.page.get());
        query
    }
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ProfessorFilter {
    #[command(flatten)]
    pub list: ListArgs,

    /// Only professors of this university id
    #[arg(long)]
    pub university: Option<String>,
}

impl ProfessorFilter {
    pub fn query(&self) -> ListQuery {
        let mut query = ListQuery::new();
        if let Some(search) = &self.list.search {
            query.set_search(search.as_str());
        }
        if let Some(university) = &self.university {
            query.set_university(university.as_str());
        }
        query.set_page(self.list.page.get());
        query
    }
}

fn parse_role(raw: &str) -> Result<UserRole, String> {
    UserRole::parse(raw).ok_or_else(|| format!("unknown role '{}' (expected student or admin)", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    fn parse(line: &str) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("califica").chain(line.split_whitespace()))
    }

    #[test]
    fn test_command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_misspelled_option_is_rejected() {
        let err = parse("professors --serach ana").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_professor_filter() {
        let cli = parse("professors --search ana --university uni1 --page 2").unwrap();
        let filter = match cli.command {
            Command::Professors(filter) => filter,
            other => panic!("expected professors, got {:?}", other),
        };
        let query = filter.query();
        assert_eq!(query.search(), "ana");
        assert_eq!(query.university(), "uni1");
        assert_eq!(query.page(), 2);
    }

    #[test]
    fn test_page_defaults_to_first_and_rejects_zero() {
        let cli = parse("universities").unwrap();
        let list = match cli.command {
            Command::Universities(list) => list,
            other => panic!("expected universities, got {:?}", other),
        };
        assert_eq!(list.page.get(), 1);
        assert_eq!(list.search, None);

        assert!(parse("universities --page 0").is_err());
        assert!(parse("universities --page two").is_err());
    }

    #[test]
    fn test_rate_collects_text_and_bounds_rating() {
        let cli = parse("rate p1 5 muy buen profesor").unwrap();
        match cli.command {
            Command::Rate {
                professor_id,
                rating,
                text,
            } => {
                assert_eq!(professor_id, "p1");
                assert_eq!(rating, 5);
                assert_eq!(text.join(" "), "muy buen profesor");
            }
            other => panic!("expected rate, got {:?}", other),
        }

        assert!(parse("rate p1 6 demasiado").is_err());
        assert!(parse("rate p1 0 nada").is_err());
        assert_eq!(parse("rate p1 4").unwrap_err().kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_edit_comment_accepts_zero_rating() {
        let cli = parse("edit-comment c1 --rating 0 --content bien").unwrap();
        match cli.command {
            Command::EditComment { id, rating, content } => {
                assert_eq!(id, "c1");
                assert_eq!(rating, Some(0));
                assert_eq!(content.as_deref(), Some("bien"));
            }
            other => panic!("expected edit-comment, got {:?}", other),
        }
    }

    #[test]
    fn test_admin_subcommands_and_routes() {
        let cli = parse("admin add-university Chile Santiago Universidad de Chile").unwrap();
        let admin = match cli.command {
            Command::Admin(admin) => admin,
            other => panic!("expected admin, got {:?}", other),
        };
        assert_eq!(admin.route(), Route::AdminUniversities);
        match admin {
            AdminCommand::AddUniversity { country, city, name } => {
                assert_eq!(country, "Chile");
                assert_eq!(city, "Santiago");
                assert_eq!(name.join(" "), "Universidad de Chile");
            }
            other => panic!("expected add-university, got {:?}", other),
        }

        let cli = parse("admin edit-user u1 --role admin").unwrap();
        match cli.command {
            Command::Admin(AdminCommand::EditUser { id, role, name, .. }) => {
                assert_eq!(id, "u1");
                assert_eq!(role, Some(UserRole::Admin));
                assert_eq!(name, None);
            }
            other => panic!("expected admin edit-user, got {:?}", other),
        }

        assert!(parse("admin edit-user u1 --role superuser").is_err());
        assert!(parse("admin unknown").is_err());
        assert!(parse("admin").is_err());
    }

    #[test]
    fn test_settings_subcommands() {
        assert!(matches!(
            parse("settings password").unwrap().command,
            Command::Settings(SettingsCommand::Password)
        ));
        match parse("settings name Ana María").unwrap().command {
            Command::Settings(SettingsCommand::Name { name }) => assert_eq!(name.join(" "), "Ana María"),
            other => panic!("expected settings name, got {:?}", other),
        }
        assert!(parse("settings").is_err());
    }

    #[test]
    fn test_api_url_flag_after_subcommand() {
        let cli = parse("whoami --api-url http://127.0.0.1:4000/api").unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://127.0.0.1:4000/api"));
    }
}
