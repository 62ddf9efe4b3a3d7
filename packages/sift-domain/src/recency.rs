//! Recency window translation.
//!
//! Windows are whole UTC calendar days, inclusive on both ends: `days = 7` on 2026-10-18 covers
//! 2026-10-11 through 2026-10-18.

use sift_config::RecencyStrategy;
use time::{Date, Duration};

use crate::filter::{MetadataField, Predicate};

/// Literal date renderings observed in hand-entered `Date` metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateFormat {
	/// `2026-03-07`
	IsoPadded,
	/// `2026-3-7`
	IsoUnpadded,
	/// `2026/03/07`
	SlashPadded,
	/// `2026/3/7`
	SlashUnpadded,
	/// `03/07/2026`
	UsPadded,
	/// `3/7/2026`
	UsUnpadded,
}
impl DateFormat {
	pub const ALL: [Self; 6] = [
		Self::IsoPadded,
		Self::IsoUnpadded,
		Self::SlashPadded,
		Self::SlashUnpadded,
		Self::UsPadded,
		Self::UsUnpadded,
	];

	pub fn render(self, date: Date) -> String {
		let year = date.year();
		let month = u8::from(date.month());
		let day = date.day();

		match self {
			Self::IsoPadded => format!("{year:04}-{month:02}-{day:02}"),
			Self::IsoUnpadded => format!("{year}-{month}-{day}"),
			Self::SlashPadded => format!("{year:04}/{month:02}/{day:02}"),
			Self::SlashUnpadded => format!("{year}/{month}/{day}"),
			Self::UsPadded => format!("{month:02}/{day:02}/{year:04}"),
			Self::UsUnpadded => format!("{month}/{day}/{year}"),
		}
	}
}

/// First day of the window.
pub fn cutoff(today: Date, days: u32) -> Date {
	today.checked_sub(Duration::days(i64::from(days))).unwrap_or(Date::MIN)
}

/// Every calendar day in the window, newest first.
pub fn window(today: Date, days: u32) -> Vec<Date> {
	let mut out = Vec::with_capacity(days as usize + 1);
	let mut current = Some(today);

	while let Some(date) = current {
		out.push(date);

		if out.len() > days as usize {
			break;
		}

		current = date.previous_day();
	}

	out
}

/// Every literal string a day in the window may be stored as.
pub fn enumerate_labels(today: Date, days: u32) -> Vec<String> {
	window(today, days)
		.into_iter()
		.flat_map(|date| DateFormat::ALL.into_iter().map(move |format| format.render(date)))
		.collect()
}

pub fn predicate(strategy: RecencyStrategy, today: Date, days: u32) -> (MetadataField, Predicate) {
	match strategy {
		RecencyStrategy::Gte => (
			MetadataField::Date,
			Predicate::Gte(DateFormat::IsoPadded.render(cutoff(today, days))),
		),
		RecencyStrategy::Enumerate =>
			(MetadataField::DateLabel, Predicate::in_set(enumerate_labels(today, days))),
	}
}
