//! Admin pages. Every command here requires the admin role.

use anyhow::Result;

use califica_core::api::ApiClient;
use califica_core::auth::PageGate;
use califica_core::listing::Scope;
use califica_core::models::{
    NewProfessor, NewUniversity, ProfessorUpdate, UniversityUpdate, UserRole, UserUpdate,
};

use crate::app::App;
use crate::args::AdminCommand;
use crate::render;

pub async fn run(app: &App, command: AdminCommand) -> Result<()> {
    let route = command.route();
    let client = app.client(route.clone())?;
    app.ensure_allowed(route, PageGate::admin()).await?;

    match command {
        AdminCommand::Stats => render::stats(&client.admin().stats().await?),
        AdminCommand::Users { query } => render::user(&client.users().find(&query).await?),
        AdminCommand::EditUser {
            id,
            name,
            email,
            role,
            password,
        } => {
            edit_user(
                &client,
                &id,
                name.as_deref(),
                email.as_deref(),
                role,
                password.as_deref(),
            )
            .await?
        }
        AdminCommand::DeleteUser { id } => {
            client.users().delete(&id).await?;
            println!("User {} deleted.", id);
        }
        AdminCommand::Professors(list) => {
            let professors = client.professors().list().await?;
            render::professors(&list.query().apply_professors(&professors, Scope::Admin));
        }
        AdminCommand::AddProfessor {
            university_id,
            department,
            name,
        } => {
            let data = NewProfessor {
                university: university_id,
                department,
                name: name.join(" "),
            };
            let created = client.professors().create(&data).await?;
            println!("Professor {} created (id: {}).", created.name, created.id);
        }
        AdminCommand::EditProfessor {
            id,
            name,
            department,
            university,
        } => {
            let service = client.professors();
            let current = service.get(&id).await?;
            let update = ProfessorUpdate::diff(
                &current,
                name.as_deref().unwrap_or(&current.name),
                department
                    .as_deref()
                    .or(current.department.as_deref())
                    .unwrap_or_default(),
                university
                    .as_deref()
                    .or(current.university_key())
                    .unwrap_or_default(),
            );
            if update.is_empty() {
                println!("Nothing to change.");
            } else {
                let updated = service.update(&id, &update).await?;
                println!("Professor {} updated.", updated.name);
            }
        }
        AdminCommand::DeleteProfessor { id } => {
            client.professors().remove(&id).await?;
            println!("Professor {} and their comments deleted.", id);
        }
        AdminCommand::Universities(list) => {
            let universities = client.universities().list().await?;
            render::universities(&list.query().apply(&universities, Scope::Admin));
        }
        AdminCommand::AddUniversity { country, city, name } => {
            let data = NewUniversity {
                country: Some(country),
                city: Some(city),
                name: name.join(" "),
            };
            let created = client.universities().create(&data).await?;
            println!("University {} created (id: {}).", created.name, created.id);
        }
        AdminCommand::EditUniversity {
            id,
            name,
            country,
            city,
        } => {
            let service = client.universities();
            let current = service.get(&id).await?;
            let update = UniversityUpdate::diff(
                &current,
                name.as_deref().unwrap_or(&current.name),
                country
                    .as_deref()
                    .or(current.country.as_deref())
                    .unwrap_or_default(),
                city.as_deref().or(current.city.as_deref()).unwrap_or_default(),
            );
            if update.is_empty() {
                println!("Nothing to change.");
            } else {
                let updated = service.update(&id, &update).await?;
                println!("University {} updated.", updated.name);
            }
        }
        AdminCommand::DeleteUniversity { id } => {
            client.universities().remove(&id).await?;
            println!("University {} deleted.", id);
        }
        AdminCommand::Comments(list) => {
            let comments = client.comments().all().await?;
            let page = list.query().apply(&comments, Scope::Admin);
            render::comments(&page.items, true);
            render::page_footer(&page, "comment");
        }
        AdminCommand::DeleteComment { id } => {
            client.comments().delete(&id).await?;
            println!("Comment {} deleted.", id);
        }
    }
    Ok(())
}

async fn edit_user(
    client: &ApiClient,
    id: &str,
    name: Option<&str>,
    email: Option<&str>,
    role: Option<UserRole>,
    password: Option<&str>,
) -> Result<()> {
    let users = client.users();
    let current = users.find(id).await?;
    let update = UserUpdate::new(
        name.unwrap_or(&current.name),
        email.unwrap_or(&current.email),
        role.unwrap_or(current.role),
        password.unwrap_or_default(),
    );
    let updated = users.update(&current.id, &update).await?;
    println!("User {} updated.", updated.email);
    Ok(())
}
