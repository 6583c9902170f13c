use unicode_segmentation::UnicodeSegmentation;

use crate::catalog::PoiStore;
use crate::config::NavigatorConfig;
use crate::models::{CommandAnalysis, Intent, IntentSet};

/// Trigger substrings per intent. Matching is case-sensitive and independent per row.
pub const INTENT_KEYWORDS: &[(Intent, &[&str])] = &[
    (
        Intent::Scenic,
        &[
            "경치", "풍경", "아름다운", "예쁜", "바다", "해안", "자연", "뷰", "전망", "scenic",
            "scenery", "view", "ocean", "coast", "nature", "beautiful", "landscape",
        ],
    ),
    (
        Intent::Food,
        &[
            "맛집", "음식", "먹거리", "카페", "식당", "흑돼지", "해산물", "맛있는", "food",
            "restaurant", "hungry", "lunch", "dinner", "seafood", "black pork", "cafe",
        ],
    ),
    (
        Intent::Fast,
        &[
            "빨리", "최단", "시간", "효율", "급해", "서둘러", "바로", "fast", "quick", "hurry",
            "shortest", "asap", "efficient",
        ],
    ),
    (
        Intent::Leisurely,
        &[
            "천천히", "여유", "둘러", "구경", "드라이브", "느긋", "편안", "slowly", "leisurely",
            "relax", "take it easy", "no rush",
        ],
    ),
    (
        Intent::Photo,
        &[
            "사진", "인스타", "핫플", "포토존", "셀카", "인생샷", "예쁜곳", "photo", "instagram",
            "selfie", "picture", "hot place",
        ],
    ),
    (
        Intent::Cultural,
        &[
            "문화", "역사", "전통", "박물관", "유적", "체험", "올레길", "culture", "cultural",
            "history", "museum", "heritage", "tradition", "olle",
        ],
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// Preposition-style marker that precedes the place ("from X").
    Before,
    /// Particle that must be attached to the place ("우도로").
    Attached,
    /// Attached to the place or within the next `n` words ("협재로 가자").
    Trailing(usize),
}

const SOURCE_MARKERS: &[(&str, Placement)] = &[
    ("from", Placement::Before),
    ("starting at", Placement::Before),
    ("starting from", Placement::Before),
    ("에서", Placement::Trailing(1)),
    ("출발", Placement::Trailing(1)),
    ("시작", Placement::Trailing(1)),
];

const DESTINATION_MARKERS: &[(&str, Placement)] = &[
    ("to", Placement::Before),
    ("toward", Placement::Before),
    ("towards", Placement::Before),
    ("까지", Placement::Trailing(2)),
    ("으로", Placement::Attached),
    ("로", Placement::Attached),
    ("가자", Placement::Trailing(2)),
    ("가고", Placement::Trailing(2)),
];

pub trait IntentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> IntentSet;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordIntentClassifier;

impl IntentClassifier for KeywordIntentClassifier {
    fn classify(&self, text: &str) -> IntentSet {
        classify_intent_rules(text)
    }
}

pub fn normalize_text(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

pub fn classify_intent_rules(text: &str) -> IntentSet {
    let mut intents = INTENT_KEYWORDS
        .iter()
        .filter(|(_, keywords)| contains_any(text, keywords))
        .map(|(intent, _)| *intent)
        .collect::<IntentSet>();

    if intents.is_empty() {
        intents.insert(Intent::General);
    }
    intents
}

#[derive(Debug, Clone)]
struct Mention {
    canonical: String,
    start: usize,
    end: usize,
}

/// Resolves the intents and endpoints of a free-text travel command.
pub fn analyze_command(
    command: &str,
    store: &PoiStore,
    classifier: &dyn IntentClassifier,
    config: &NavigatorConfig,
) -> CommandAnalysis {
    let intents = classifier.classify(command);
    let mentions = find_mentions(command, store);

    let marked_start = mentions
        .iter()
        .find(|mention| has_marker(command, mention, SOURCE_MARKERS))
        .map(|mention| mention.canonical.clone());

    let marked_end = mentions
        .iter()
        .rev()
        .filter(|mention| Some(&mention.canonical) != marked_start.as_ref())
        .find(|mention| has_marker(command, mention, DESTINATION_MARKERS))
        .map(|mention| mention.canonical.clone());

    let start = marked_start.or_else(|| {
        mentions
            .iter()
            .find(|mention| Some(&mention.canonical) != marked_end.as_ref())
            .map(|mention| mention.canonical.clone())
    });

    let end = marked_end.or_else(|| {
        if mentions.len() > 1 {
            mentions
                .iter()
                .rev()
                .find(|mention| Some(&mention.canonical) != start.as_ref())
                .map(|mention| mention.canonical.clone())
        } else {
            None
        }
    });

    let has_specific_intent = intents.iter().any(|intent| *intent != Intent::General);
    let confidence = if has_specific_intent && !mentions.is_empty() {
        0.9
    } else {
        0.7
    };

    CommandAnalysis {
        command: command.to_string(),
        intents,
        start: start.unwrap_or_else(|| config.default_start.name.clone()),
        end: end.unwrap_or_else(|| config.default_end.name.clone()),
        mentioned_locations: mentions.into_iter().map(|mention| mention.canonical).collect(),
        confidence,
    }
}

fn find_mentions(command: &str, store: &PoiStore) -> Vec<Mention> {
    let mut candidates: Vec<Mention> = Vec::new();
    for (term, canonical) in store.location_terms() {
        if term.is_empty() {
            continue;
        }
        candidates.extend(command.match_indices(term).map(|(start, _)| Mention {
            canonical: canonical.to_string(),
            start,
            end: start + term.len(),
        }));
    }

    // A term nested inside a longer term of another place is not a mention ("애월" in "애월해안도로").
    let standalone = candidates
        .iter()
        .filter(|inner| {
            !candidates.iter().any(|outer| {
                outer.canonical != inner.canonical
                    && outer.start <= inner.start
                    && inner.end <= outer.end
                    && outer.end - outer.start > inner.end - inner.start
            })
        })
        .collect::<Vec<_>>();

    let mut mentions: Vec<Mention> = Vec::new();
    for candidate in standalone {
        match mentions.iter_mut().find(|m| m.canonical == candidate.canonical) {
            Some(existing) => {
                let earlier = candidate.start < existing.start;
                let wider = candidate.start == existing.start && candidate.end > existing.end;
                if earlier || wider {
                    existing.start = candidate.start;
                    existing.end = candidate.end;
                }
            }
            None => mentions.push(candidate.clone()),
        }
    }

    mentions.sort_by_key(|mention| mention.start);
    mentions
}

fn has_marker(command: &str, mention: &Mention, markers: &[(&str, Placement)]) -> bool {
    let before = command[..mention.start].unicode_words().collect::<Vec<_>>();
    let after = &command[mention.end..];

    markers.iter().any(|(marker, placement)| match placement {
        Placement::Before => {
            let marker_words = marker.unicode_words().collect::<Vec<_>>();
            before.ends_with(&marker_words)
        }
        Placement::Attached => after.starts_with(marker),
        Placement::Trailing(window) => {
            after.starts_with(marker)
                || after
                    .unicode_words()
                    .take(*window)
                    .any(|word| word.starts_with(marker))
        }
    })
}

fn contains_any(input: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| input.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, Poi, PoiCategory};

    fn store() -> PoiStore {
        PoiStore::new(vec![
            Poi::new(
                "Airport",
                Coordinate::new_unchecked(126.4930, 33.5107),
                PoiCategory::Transport,
                "transport-hub",
            )
            .with_keywords(["제주공항", "공항"]),
            Poi::new(
                "Sunrise Peak",
                Coordinate::new_unchecked(126.9423, 33.4586),
                PoiCategory::Attraction,
                "natural-scenery",
            )
            .with_keywords(["성산일출봉", "성산", "일출봉"]),
            Poi::new(
                "Hyeopjae Beach",
                Coordinate::new_unchecked(126.2397, 33.3948),
                PoiCategory::Attraction,
                "beach",
            )
            .with_keywords(["협재", "협재해변"]),
            Poi::new(
                "Aewol Cafe Street",
                Coordinate::new_unchecked(126.3094, 33.4647),
                PoiCategory::Hotspot,
                "cafe-culture",
            )
            .with_keywords(["애월", "애월카페거리"]),
            Poi::new(
                "Aewol Coastal Road",
                Coordinate::new_unchecked(126.3186, 33.4729),
                PoiCategory::Attraction,
                "scenic-drive",
            )
            .with_keywords(["애월해안도로"]),
            Poi::new(
                "Udo Island",
                Coordinate::new_unchecked(126.9512, 33.5064),
                PoiCategory::Attraction,
                "island",
            )
            .with_keywords(["우도"]),
        ])
        .expect("valid store")
    }

    fn analyze(command: &str) -> CommandAnalysis {
        analyze_command(
            command,
            &store(),
            &KeywordIntentClassifier,
            &NavigatorConfig::default(),
        )
    }

    #[test]
    fn detects_co_occurring_intents() {
        let intents = classify_intent_rules("사진 찍기 좋은 맛집 들러서 천천히");
        assert!(intents.contains(&Intent::Photo));
        assert!(intents.contains(&Intent::Food));
        assert!(intents.contains(&Intent::Leisurely));
        assert!(!intents.contains(&Intent::General));
    }

    #[test]
    fn falls_back_to_general() {
        let intents = classify_intent_rules("hello there");
        assert_eq!(intents.into_iter().collect::<Vec<_>>(), vec![Intent::General]);
    }

    #[test]
    fn keyword_matching_is_case_sensitive() {
        assert!(classify_intent_rules("SCENIC").contains(&Intent::General));
    }

    #[test]
    fn resolves_english_markers() {
        let analysis = analyze("from Airport to Sunrise Peak, scenic route please");
        assert_eq!(analysis.intents.iter().copied().collect::<Vec<_>>(), vec![Intent::Scenic]);
        assert_eq!(analysis.start, "Airport");
        assert_eq!(analysis.end, "Sunrise Peak");
        assert_eq!(analysis.confidence, 0.9);
    }

    #[test]
    fn resolves_korean_postpositions_and_aliases() {
        let analysis = analyze("애월카페거리에서 맛집 들러서 협재해변까지");
        assert_eq!(analysis.start, "Aewol Cafe Street");
        assert_eq!(analysis.end, "Hyeopjae Beach");
        assert_eq!(
            analysis.mentioned_locations,
            vec!["Aewol Cafe Street".to_string(), "Hyeopjae Beach".to_string()]
        );
    }

    #[test]
    fn destination_marker_can_stand_alone() {
        let analysis = analyze("성산까지 빨리");
        assert_eq!(analysis.end, "Sunrise Peak");
        assert_eq!(analysis.start, NavigatorConfig::default().default_start.name);
    }

    #[test]
    fn unmarked_mentions_use_order() {
        let analysis = analyze("Hyeopjae Beach then Sunrise Peak");
        assert_eq!(analysis.start, "Hyeopjae Beach");
        assert_eq!(analysis.end, "Sunrise Peak");
    }

    #[test]
    fn no_location_uses_defaults() {
        let analysis = analyze("somewhere nice with good food");
        let defaults = NavigatorConfig::default();
        assert_eq!(analysis.start, defaults.default_start.name);
        assert_eq!(analysis.end, defaults.default_end.name);
        assert!(analysis.mentioned_locations.is_empty());
        assert_eq!(analysis.confidence, 0.7);
    }

    #[test]
    fn extraction_is_idempotent() {
        let command = "제주공항에서 성산일출봉까지 경치 좋은 길로 천천히 가고 싶어";
        let first = analyze(command);
        let second = analyze(command);
        assert_eq!(first.intents, second.intents);
        assert_eq!(first.start, second.start);
        assert_eq!(first.end, second.end);
        assert_eq!(first.start, "Airport");
        assert_eq!(first.end, "Sunrise Peak");
    }

    #[test]
    fn korean_destination_particles_mark_the_end() {
        let defaults = NavigatorConfig::default();
        for (command, end) in [
            ("우도로 가자", "Udo Island"),
            ("협재로 가고 싶어", "Hyeopjae Beach"),
            ("우도 쪽으로 가자", "Udo Island"),
            ("성산 쪽 까지 부탁해", "Sunrise Peak"),
        ] {
            let analysis = analyze(command);
            assert_eq!(analysis.end, end, "{command}");
            assert_eq!(analysis.start, defaults.default_start.name, "{command}");
        }
    }

    #[test]
    fn destination_particle_follows_the_source() {
        let analysis = analyze("성산에서 출발해서 우도로 가자");
        assert_eq!(analysis.start, "Sunrise Peak");
        assert_eq!(analysis.end, "Udo Island");
    }

    #[test]
    fn nested_alias_is_not_a_separate_mention() {
        let analysis = analyze("애월해안도로에서 출발");
        assert_eq!(analysis.mentioned_locations, vec!["Aewol Coastal Road".to_string()]);
        assert_eq!(analysis.start, "Aewol Coastal Road");
        assert_eq!(analysis.end, NavigatorConfig::default().default_end.name);

        let analysis = analyze("애월해안도로 지나서 애월까지");
        assert_eq!(
            analysis.mentioned_locations,
            vec!["Aewol Coastal Road".to_string(), "Aewol Cafe Street".to_string()]
        );
        assert_eq!(analysis.end, "Aewol Cafe Street");
    }
}
