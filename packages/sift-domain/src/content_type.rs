//! Content-type facet parsing and translation.
//!
//! The index stores multi-type items under one concatenated label (`"Podcast, Video"`), and
//! editors did not keep a canonical order inside those labels. Both facts leak into the filters
//! built here.

use std::collections::BTreeSet;

use sift_config::ContentTypeMode;

use crate::filter::{MetadataField, Predicate};

pub const COMBO_LABEL: &str = "Podcast, Video";
pub const LABEL_ALL: &str = "All Content Types";
pub const LABEL_ESSAYS_ONLY: &str = "Essays Only";
pub const LABEL_PODCASTS_VIDEOS_ONLY: &str = "Podcasts/Videos Only";

const ESSAY_ONLY_TAGS: [&str; 2] = ["Essay", "Essays"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContentKind {
	Essay,
	Podcast,
	Video,
}
impl ContentKind {
	pub const ALL: [Self; 3] = [Self::Essay, Self::Podcast, Self::Video];

	pub fn label(self) -> &'static str {
		match self {
			Self::Essay => "Essay",
			Self::Podcast => "Podcast",
			Self::Video => "Video",
		}
	}

	/// Labels an item of this kind may be stored under in token mode.
	pub fn stored_labels(self) -> &'static [&'static str] {
		match self {
			Self::Essay => &["Essay"],
			Self::Podcast => &["Podcast", COMBO_LABEL],
			Self::Video => &["Video", COMBO_LABEL],
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentTypeFilter {
	/// No content-type restriction.
	All,
	/// Token mode: any of these kinds.
	Kinds(BTreeSet<ContentKind>),
	/// Label mode: anything whose label mentions an essay.
	EssaysOnly,
	/// Label mode: anything not tagged as a pure essay.
	PodcastsVideosOnly,
}
impl ContentTypeFilter {
	pub fn parse(mode: ContentTypeMode, raw: Option<&str>) -> Self {
		let Some(raw) = raw else { return Self::All };

		match mode {
			ContentTypeMode::Tokens => Self::parse_tokens(raw),
			ContentTypeMode::Labels => Self::parse_label(raw),
		}
	}

	/// Parses `essay,podcast` style selectors. `all` anywhere wins; unknown tokens are ignored.
	pub fn parse_tokens(raw: &str) -> Self {
		let mut kinds = BTreeSet::new();

		for token in raw.split([',', '/']) {
			match token.trim().to_ascii_lowercase().as_str() {
				"all" => return Self::All,
				"essay" => {
					kinds.insert(ContentKind::Essay);
				},
				"podcast" | "podcasts" => {
					kinds.insert(ContentKind::Podcast);
				},
				"video" | "videos" => {
					kinds.insert(ContentKind::Video);
				},
				_ => {},
			}
		}

		if kinds.is_empty() { Self::All } else { Self::Kinds(kinds) }
	}

	/// Parses one of the closed-set facet labels. Anything unrecognized means no restriction.
	pub fn parse_label(raw: &str) -> Self {
		let label = raw.trim();

		if label.eq_ignore_ascii_case(LABEL_ESSAYS_ONLY) {
			Self::EssaysOnly
		} else if label.eq_ignore_ascii_case(LABEL_PODCASTS_VIDEOS_ONLY) {
			Self::PodcastsVideosOnly
		} else {
			Self::All
		}
	}

	pub fn predicate(&self) -> Option<(MetadataField, Predicate)> {
		match self {
			Self::All => None,
			Self::Kinds(kinds) => {
				let labels = kinds.iter().flat_map(|kind| kind.stored_labels().iter().copied());

				Some((MetadataField::FinalType, Predicate::in_set(labels)))
			},
			Self::EssaysOnly =>
				Some((MetadataField::Type, Predicate::in_set(essay_label_variants()))),
			// Not the complement of `EssaysOnly`: "Essay, Podcast" passes both.
			Self::PodcastsVideosOnly =>
				Some((MetadataField::Type, Predicate::not_in_set(ESSAY_ONLY_TAGS))),
		}
	}
}

/// Every stored label that contains "Essay": each subset of the other kinds joined with Essay,
/// in every order.
pub fn essay_label_variants() -> Vec<String> {
	let others = [ContentKind::Podcast.label(), ContentKind::Video.label()];
	let mut labels = Vec::new();

	for mask in 0..(1_usize << others.len()) {
		let mut members = vec![ContentKind::Essay.label()];

		members.extend(
			others.iter().enumerate().filter(|(bit, _)| mask & (1 << bit) != 0).map(|(_, l)| *l),
		);

		for order in permutations(&members) {
			labels.push(order.join(", "));
		}
	}

	labels
}

fn permutations<'a>(items: &[&'a str]) -> Vec<Vec<&'a str>> {
	if items.len() <= 1 {
		return vec![items.to_vec()];
	}

	let mut out = Vec::new();

	for (index, head) in items.iter().enumerate() {
		let mut rest = items.to_vec();

		rest.remove(index);

		for mut tail in permutations(&rest) {
			tail.insert(0, *head);
			out.push(tail);
		}
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn permutations_cover_every_order() {
		let orders = permutations(&["a", "b", "c"]);

		assert_eq!(orders.len(), 6);
		assert!(orders.contains(&vec!["c", "b", "a"]));
	}

	#[test]
	fn essay_variants_are_exhaustive() {
		let labels = essay_label_variants();

		assert_eq!(labels.len(), 11);
		assert_eq!(labels[0], "Essay");

		for expected in [
			"Essay, Podcast",
			"Podcast, Essay",
			"Video, Essay",
			"Essay, Video, Podcast",
			"Video, Podcast, Essay",
			"Podcast, Essay, Video",
		] {
			assert!(labels.iter().any(|label| label == expected), "Missing {expected}.");
		}
		assert!(labels.iter().all(|label| label.contains("Essay")));
		assert!(!labels.iter().any(|label| label == COMBO_LABEL));
	}

	#[test]
	fn tokens_split_on_commas_and_slashes() {
		let filter = ContentTypeFilter::parse_tokens(" Podcasts / video,essay ");

		assert_eq!(filter, ContentTypeFilter::Kinds(ContentKind::ALL.into_iter().collect()));
	}

	#[test]
	fn all_token_overrides_others() {
		assert_eq!(ContentTypeFilter::parse_tokens("essay,all"), ContentTypeFilter::All);
	}

	#[test]
	fn label_matching_ignores_case_and_padding() {
		assert_eq!(ContentTypeFilter::parse_label("  essays only "), ContentTypeFilter::EssaysOnly);
		assert_eq!(ContentTypeFilter::parse_label(LABEL_ALL), ContentTypeFilter::All);
		assert_eq!(ContentTypeFilter::parse_label("Newsletters"), ContentTypeFilter::All);
	}
}
