//! Public pages: professor and university listings and details.

use anyhow::Result;

use califica_core::auth::PageGate;
use califica_core::listing::{filter_by_university, Scope};
use califica_core::routes::Route;

use crate::app::App;
use crate::args::{ListArgs, ProfessorFilter};
use crate::render;

pub async fn professors(app: &App, filter: &ProfessorFilter) -> Result<()> {
    let query = filter.query();
    let client = app.client(Route::Professors)?;
    let professors = client.professors().list().await?;
    render::professors(&query.apply_professors(&professors, Scope::Public));
    Ok(())
}

pub async fn professor(app: &App, id: &str) -> Result<()> {
    let client = app.client(Route::Professor(id.to_string()))?;
    let service = client.professors();
    let (professor, comments) = tokio::try_join!(service.get(id), service.comments(id))?;
    render::professor(&professor, &comments);
    Ok(())
}

pub async fn rate(app: &App, id: &str, rating: u8, content: &str) -> Result<()> {
    let route = Route::Professor(id.to_string());
    let client = app.client(route.clone())?;
    let service = client.professors();
    app.guarded(route, PageGate::authenticated(), || {
        service.add_comment(id, rating, content)
    })
    .await?;

    println!("Thanks! Your rating was posted.");
    Ok(())
}

pub async fn universities(app: &App, list: &ListArgs) -> Result<()> {
    let query = list.query();
    let client = app.client(Route::Universities)?;
    let universities = client.universities().list().await?;
    render::universities(&query.apply(&universities, Scope::Public));
    Ok(())
}

pub async fn university(app: &App, id: &str) -> Result<()> {
    let client = app.client(Route::University(id.to_string()))?;
    let (universities, professors) = (client.universities(), client.professors());
    let (university, professors) = tokio::try_join!(universities.get(id), professors.list())?;
    render::university(&university, &filter_by_university(professors, id));
    Ok(())
}
