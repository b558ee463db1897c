//! Special dates, daily moods and bookmarked advice.

pub mod advice;
pub mod handlers;
pub mod moods;
pub mod special_dates;
