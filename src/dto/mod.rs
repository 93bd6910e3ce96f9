use std::time::SystemTime;
use time::{Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description};

pub mod follow;
pub mod game;
pub mod health;
pub mod list;
pub mod rating;
pub mod reference;
pub mod review;
pub mod user;
pub mod validation;

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}

fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| "invalid-date".into())
}
