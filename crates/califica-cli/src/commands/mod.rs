//! One function per command. Each command behaves like a page: it enters a
//! route, passes the page gate when the page is protected, then loads.

mod account;
mod admin;
mod browse;
mod session;

use anyhow::Result;

use crate::app::App;
use crate::args::Command;

pub async fn run(app: &App, command: Command) -> Result<()> {
    match command {
        Command::Login { email } => session::login(app, email).await,
        Command::Signup => session::signup(app).await,
        Command::Logout => session::logout(app).await,
        Command::Whoami => session::whoami(app).await,
        Command::Verify { token } => session::verify(app, &token).await,
        Command::ResendVerification { email } => session::resend_verification(app, &email).await,
        Command::Professors(filter) => browse::professors(app, &filter).await,
        Command::Professor { id } => browse::professor(app, &id).await,
        Command::Rate {
            professor_id,
            rating,
            text,
        } => browse::rate(app, &professor_id, rating, &text.join(" ")).await,
        Command::Universities(list) => browse::universities(app, &list).await,
        Command::University { id } => browse::university(app, &id).await,
        Command::Profile => account::profile(app).await,
        Command::MyComments => account::my_comments(app).await,
        Command::EditComment { id, rating, content } => {
            account::edit_comment(app, &id, rating, content).await
        }
        Command::DeleteComment { id } => account::delete_comment(app, &id).await,
        Command::Settings(settings) => account::settings(app, settings).await,
        Command::Admin(admin) => admin::run(app, admin).await,
    }
}
