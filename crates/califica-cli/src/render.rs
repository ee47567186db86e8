//! Plain-text output for list and detail pages.

use califica_core::listing::{page_window, Page, PageMarker};
use califica_core::models::{
    AdminStats, Comment, Professor, ProfessorComment, ProfileData, University, User,
};
use califica_core::utils::{format_date, format_rating, stars, truncate_string};

/// Width of the text column in comment listings.
const CONTENT_WIDTH: usize = 60;

pub fn page_footer<T>(page: &Page<T>, noun: &str) {
    println!();
    println!(
        "{} {}{} found",
        page.total_items,
        noun,
        if page.total_items == 1 { "" } else { "s" }
    );
    let window = page_window(page.number, page.total_pages);
    if window.is_empty() {
        return;
    }
    let pages: Vec<String> = window
        .into_iter()
        .map(|marker| match marker {
            PageMarker::Page(n) if n == page.number => format!("[{}]", n),
            PageMarker::Page(n) => n.to_string(),
            PageMarker::Ellipsis => "...".to_string(),
        })
        .collect();
    println!("Page {} of {}: {}", page.number, page.total_pages, pages.join(" "));
}

pub fn professors(page: &Page<Professor>) {
    if page.is_empty() {
        println!("No professors match your search.");
        return;
    }
    for p in &page.items {
        let rating = p.average_rating.unwrap_or(0.0);
        println!(
            "{}  {} {}  {}",
            stars(rating),
            format_rating(rating),
            p.name,
            p.university_name().unwrap_or("-"),
        );
        println!(
            "    {}  id: {}",
            p.department.as_deref().unwrap_or("-"),
            p.id
        );
    }
    page_footer(page, "professor");
}

pub fn professor(p: &Professor, comments: &[ProfessorComment]) {
    let rating = p.display_rating(comments);
    println!("{}", p.name);
    println!("Department: {}", p.department.as_deref().unwrap_or("-"));
    println!("University: {}", p.university_name().unwrap_or("-"));
    if let Some(bio) = p.bio.as_deref().filter(|b| !b.is_empty()) {
        println!("{}", bio);
    }
    println!(
        "{} {} ({} rating{})",
        stars(rating),
        format_rating(rating),
        comments.len(),
        if comments.len() == 1 { "" } else { "s" }
    );
    println!();
    if comments.is_empty() {
        println!("No ratings yet.");
    }
    for c in comments {
        let author = c.author.as_ref().map(|a| a.name.as_str()).unwrap_or("Anonymous");
        println!(
            "{}  {}  {}",
            stars(f64::from(c.rating)),
            author,
            format_date(c.created_at.as_ref())
        );
        println!("    {}", c.content);
    }
}

pub fn universities(page: &Page<University>) {
    if page.is_empty() {
        println!("No universities match your search.");
        return;
    }
    for u in &page.items {
        println!(
            "{}  {}  id: {}",
            u.name,
            u.location().unwrap_or_else(|| "-".to_string()),
            u.id
        );
    }
    page_footer(page, "university");
}

pub fn university(u: &University, professors: &[Professor]) {
    println!("{}", u.name);
    if let Some(location) = u.location() {
        println!("{}", location);
    }
    println!();
    println!("Professors ({}):", professors.len());
    for p in professors {
        println!("  {}  {}  id: {}", p.name, p.department.as_deref().unwrap_or("-"), p.id);
    }
}

pub fn user(user: &User) {
    println!("{} <{}>", user.name, user.email);
    println!("Role: {}", user.role);
    if let Some(verified) = user.is_email_verified {
        println!("Email verified: {}", if verified { "yes" } else { "no" });
    }
    println!("Member since: {}", format_date(user.created_at.as_ref()));
    println!("id: {}", user.id);
}

pub fn profile(profile: &ProfileData) {
    user(&profile.user);
    println!("Comments: {}", profile.stats.total_comments);
}

pub fn comments(comments: &[Comment], with_student: bool) {
    if comments.is_empty() {
        println!("No comments.");
        return;
    }
    for c in comments {
        let professor = c.professor.as_ref().map(|p| p.name.as_str()).unwrap_or("-");
        let rating = c.rating.map(f64::from).unwrap_or(0.0);
        println!(
            "{}  {}  {}  id: {}",
            stars(rating),
            professor,
            format_date(c.created_at.as_ref()),
            c.id
        );
        if with_student {
            if let Some(s) = &c.student {
                println!("    by {} <{}>", s.name, s.email);
            }
        }
        println!("    {}", truncate_string(&c.content, CONTENT_WIDTH));
    }
}

pub fn stats(stats: &AdminStats) {
    println!("Users:        {}", stats.total_users);
    println!("Professors:   {}", stats.total_professors);
    println!("Universities: {}", stats.total_universities);
    println!("Comments:     {}", stats.total_comments);
}
