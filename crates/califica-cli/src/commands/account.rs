//! Pages for the signed-in user: profile, own comments and settings.

use anyhow::{anyhow, bail, Result};

use califica_core::auth::PageGate;
use califica_core::models::CommentUpdate;
use califica_core::routes::Route;
use califica_core::validate::DELETE_CONFIRMATION;

use crate::app::{prompt, prompt_password, App};
use crate::args::SettingsCommand;
use crate::render;

pub async fn profile(app: &App) -> Result<()> {
    let client = app.client(Route::Profile)?;
    let service = client.profile();
    let profile = app
        .guarded(Route::Profile, PageGate::authenticated(), || service.profile())
        .await?;
    render::profile(&profile);
    Ok(())
}

pub async fn my_comments(app: &App) -> Result<()> {
    let client = app.client(Route::MyComments)?;
    let service = client.comments();
    let comments = app
        .guarded(Route::MyComments, PageGate::authenticated(), || service.mine())
        .await?;
    render::comments(&comments, false);
    Ok(())
}

pub async fn edit_comment(app: &App, id: &str, rating: Option<u8>, content: Option<String>) -> Result<()> {
    let update = CommentUpdate {
        content,
        // 0 means "leave the rating alone", as on the edit form
        rating: rating.filter(|r| *r != 0),
    };
    if update == CommentUpdate::default() {
        bail!("Nothing to change. Pass --rating and/or --content.");
    }

    let client = app.client(Route::MyComments)?;
    let service = client.comments();
    app.guarded(Route::MyComments, PageGate::authenticated(), || service.update(id, &update))
        .await?;
    println!("Comment updated.");
    Ok(())
}

pub async fn delete_comment(app: &App, id: &str) -> Result<()> {
    let client = app.client(Route::MyComments)?;
    let service = client.comments();
    app.guarded(Route::MyComments, PageGate::authenticated(), || service.delete(id))
        .await?;
    println!("Comment deleted.");
    Ok(())
}

pub async fn settings(app: &App, command: SettingsCommand) -> Result<()> {
    let client = app.client(Route::Settings)?;
    app.ensure_allowed(Route::Settings, PageGate::authenticated()).await?;
    let user = app.store.user().ok_or_else(|| anyhow!("Not logged in"))?;
    let service = client.profile();

    match command {
        SettingsCommand::Name { name } => {
            let name = name.join(" ");
            let update = service.update_profile(&app.store, &name, &user.email).await?;
            println!("Name changed to {}.", update.user.name);
        }
        SettingsCommand::Email { email } => {
            let update = service.update_profile(&app.store, &user.name, &email).await?;
            if update.email_changed {
                println!("Email changed. Check {} for a verification link.", update.user.email);
            } else {
                println!("Email unchanged.");
            }
        }
        SettingsCommand::Password => {
            let password = prompt_password("New password")?;
            let confirmation = prompt_password("Confirm new password")?;
            service.change_password(&app.store, &password, &confirmation).await?;
            println!("Password changed.");
        }
        SettingsCommand::Delete => {
            println!("This permanently deletes your account and all your ratings.");
            let typed = prompt(&format!("Type {} to confirm", DELETE_CONFIRMATION), None)?;
            service.delete_account(&app.store, &typed).await?;
            println!("Your account has been deleted.");
        }
    }
    Ok(())
}
