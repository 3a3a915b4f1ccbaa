//! Reconstruct team rows and sprint columns from element geometry alone.

use crate::classify::parse_sprint_label;
use crate::domain::{
    BoundaryTuning, Element, ElementId, ElementRole, GeometrySnapshot, SprintKey, BACKLOG,
    UNKNOWN_TEAM,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Vertical extent of one team row, top and bottom inclusive.
///
/// Bands are separated by real gaps, so an element touching a band's bottom
/// edge belongs to it. Sprint ranges share their separator edges and are
/// half-open instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamBoundary {
    pub name: String,
    pub range_start: f64,
    pub range_end: f64,
}

impl TeamBoundary {
    fn contains(&self, y: f64) -> bool {
        y >= self.range_start && y <= self.range_end
    }
}

/// Horizontal extent of one sprint column inside a team row, `[start, end)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SprintBoundary {
    pub name: String,
    pub sprint_key: SprintKey,
    pub range_start: f64,
    pub range_end: f64,
    /// The header label that produced this boundary
    pub header_id: ElementId,
    /// No separator was found on at least one side
    pub ambiguous: bool,
}

impl SprintBoundary {
    fn contains(&self, x: f64) -> bool {
        x >= self.range_start && x < self.range_end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamBand {
    #[serde(flatten)]
    pub team: TeamBoundary,
    pub sprints: Vec<SprintBoundary>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BoardBoundaries {
    pub bands: Vec<TeamBand>,
}

impl BoardBoundaries {
    pub fn sprint_count(&self) -> usize {
        self.bands.iter().map(|b| b.sprints.len()).sum()
    }

    pub fn ambiguous_count(&self) -> usize {
        self.bands.iter().flat_map(|b| &b.sprints).filter(|s| s.ambiguous).count()
    }
}

/// Team and sprint an element falls in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementAssignment {
    pub element_id: ElementId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_key: Option<String>,
    pub team: Option<String>,
    pub sprint_key: Option<SprintKey>,
}

impl ElementAssignment {
    pub fn is_complete(&self) -> bool {
        self.team.is_some() && self.sprint_key.is_some()
    }
}

fn has_finite_rect(element: &Element) -> bool {
    let r = &element.rect;
    r.x.is_finite() && r.y.is_finite() && r.width.is_finite() && r.height.is_finite()
}

/// The sprint key a header label names, if `element` is a header label.
///
/// Elements with an explicit non-header role never count; unlabelled ones
/// count when they carry no issue key and are not epic labels.
pub fn header_key(element: &Element) -> Option<SprintKey> {
    match element.meta.role {
        Some(ElementRole::SprintHeader) => {}
        Some(_) => return None,
        None => {
            if element.issue_key().is_some() || element.meta.is_epic_label || element.is_separator() {
                return None;
            }
        }
    }
    let text = element.text.as_deref()?.lines().next()?.trim();
    if text.eq_ignore_ascii_case(BACKLOG) {
        return Some(SprintKey::Backlog);
    }
    parse_sprint_label(text).map(|label| label.key)
}

/// Plurality of the members' team labels; a tie or no votes gives `Unknown`.
fn band_name<'a>(members: impl Iterator<Item = &'a Element>) -> String {
    let mut votes: BTreeMap<&str, usize> = BTreeMap::new();
    for element in members {
        if let Some(team) = element.meta.team.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            *votes.entry(team).or_insert(0) += 1;
        }
    }
    let Some(best) = votes.values().copied().max() else {
        return UNKNOWN_TEAM.to_string();
    };
    let mut leaders = votes.iter().filter(|(_, count)| **count == best);
    match (leaders.next(), leaders.next()) {
        (Some((team, _)), None) => team.to_string(),
        _ => UNKNOWN_TEAM.to_string(),
    }
}

/// Cluster elements into team bands by vertical overlap.
fn cluster_bands<'a>(elements: &[&'a Element], tolerance: f64) -> Vec<(f64, f64, Vec<&'a Element>)> {
    let mut sorted: Vec<&Element> = elements.to_vec();
    sorted.sort_by(|a, b| a.rect.top().total_cmp(&b.rect.top()).then_with(|| a.id.cmp(&b.id)));

    let mut bands: Vec<(f64, f64, Vec<&Element>)> = Vec::new();
    for element in sorted {
        if let Some((_, bottom, members)) = bands.last_mut() {
            if element.rect.top() <= *bottom + tolerance {
                *bottom = bottom.max(element.rect.bottom());
                members.push(element);
                continue;
            }
        }
        bands.push((element.rect.top(), element.rect.bottom(), vec![element]));
    }
    bands
}

/// Nearest separators on each side of a header.
///
/// The search distance counts from the header's own edges, so a header as
/// wide as its column finds the rules bracketing it however wide it is.
fn sprint_boundary(
    header: &Element,
    key: SprintKey,
    separators: &[&Element],
    tuning: &BoundaryTuning,
) -> SprintBoundary {
    let (left_edge, right_edge) = (header.rect.left(), header.rect.right());
    let cx = header.rect.center_x();
    let max = tuning.max_separator_distance;
    let left = separators
        .iter()
        .map(|s| s.rect.center_x())
        .filter(|sx| *sx <= cx && left_edge - *sx <= max)
        .max_by(f64::total_cmp);
    let right = separators
        .iter()
        .map(|s| s.rect.center_x())
        .filter(|sx| *sx > cx && *sx - right_edge <= max)
        .min_by(f64::total_cmp);

    let ambiguous = left.is_none() || right.is_none();
    if ambiguous {
        tracing::warn!(
            "No separator beside header {} ({}); using a {} wide fallback",
            header.id,
            key,
            tuning.fallback_half_width * 2.0
        );
    }
    SprintBoundary {
        name: key.to_string(),
        sprint_key: key,
        range_start: left.unwrap_or_else(|| left_edge.min(cx - tuning.fallback_half_width)),
        range_end: right.unwrap_or_else(|| right_edge.max(cx + tuning.fallback_half_width)),
        header_id: header.id.clone(),
        ambiguous,
    }
}

/// Detect team bands and the sprint boundaries inside each.
///
/// Pure: the same snapshot and tuning always give the same boundaries.
pub fn detect_boundaries(snapshot: &GeometrySnapshot, tuning: &BoundaryTuning) -> BoardBoundaries {
    let elements: Vec<&Element> = snapshot.elements.iter().filter(|e| has_finite_rect(e)).collect();
    let skipped = snapshot.elements.len() - elements.len();
    if skipped > 0 {
        tracing::debug!("Ignoring {} elements with non-finite geometry", skipped);
    }
    let separators: Vec<&Element> = elements.iter().copied().filter(|e| e.is_separator()).collect();

    let mut bands = Vec::new();
    for (top, bottom, members) in cluster_bands(&elements, tuning.cluster_tolerance) {
        let name = band_name(members.iter().copied());
        let band_separators: Vec<&Element> = separators
            .iter()
            .copied()
            .filter(|s| s.rect.bottom() >= top && s.rect.top() <= bottom)
            .collect();

        let mut sprints: Vec<SprintBoundary> = members
            .iter()
            .filter_map(|e| header_key(e).map(|key| (*e, key)))
            .map(|(header, key)| sprint_boundary(header, key, &band_separators, tuning))
            .collect();
        sprints.sort_by(|a, b| {
            a.range_start.total_cmp(&b.range_start).then_with(|| a.header_id.cmp(&b.header_id))
        });

        tracing::debug!(
            "Team band {} [{}, {}]: {} members, {} sprint boundaries",
            name,
            top,
            bottom,
            members.len(),
            sprints.len()
        );
        bands.push(TeamBand {
            team: TeamBoundary { name, range_start: top, range_end: bottom },
            sprints,
        });
    }
    BoardBoundaries { bands }
}

/// Classify one element by center-or-edge containment; first match wins.
pub fn classify_element(boundaries: &BoardBoundaries, element: &Element) -> ElementAssignment {
    let rect = &element.rect;
    let band = boundaries.bands.iter().find(|band| {
        band.team.contains(rect.center_y())
            || band.team.contains(rect.top())
            || band.team.contains(rect.bottom())
    });
    let sprint = band.and_then(|band| {
        band.sprints.iter().find(|s| {
            s.contains(rect.center_x()) || s.contains(rect.left()) || s.contains(rect.right())
        })
    });
    ElementAssignment {
        element_id: element.id.clone(),
        issue_key: element.issue_key().map(str::to_string),
        team: band.map(|b| b.team.name.clone()),
        sprint_key: sprint.map(|s| s.sprint_key),
    }
}

/// Classify every element of the snapshot, in snapshot order.
pub fn reclassify(snapshot: &GeometrySnapshot, boundaries: &BoardBoundaries) -> Vec<ElementAssignment> {
    snapshot.elements.iter().map(|e| classify_element(boundaries, e)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ElementMeta, Rect};

    fn header(id: &str, text: &str, x: f64, y: f64) -> Element {
        Element {
            id: id.into(),
            rect: Rect::new(x, y, 200.0, 40.0),
            text: Some(text.to_string()),
            meta: ElementMeta { team: Some("Triton".into()), ..Default::default() },
        }
    }

    fn separator(id: &str, x: f64, y: f64, height: f64) -> Element {
        Element {
            id: id.into(),
            rect: Rect::new(x - 1.0, y, 2.0, height),
            text: None,
            meta: ElementMeta::default(),
        }
    }

    fn card(id: &str, key: &str, team: &str, x: f64, y: f64) -> Element {
        Element {
            id: id.into(),
            rect: Rect::new(x, y, 180.0, 100.0),
            text: Some(format!("card {key}")),
            meta: ElementMeta {
                issue_key: Some(key.into()),
                team: Some(team.into()),
                ..Default::default()
            },
        }
    }

    fn board() -> GeometrySnapshot {
        GeometrySnapshot::new(vec![
            header("h-backlog", "Backlog", 0.0, 0.0),
            header("h-1", "Triton 2025-1", 300.0, 0.0),
            header("h-2", "2025-2", 600.0, 0.0),
            separator("s0", -10.0, 0.0, 400.0),
            separator("s1", 250.0, 0.0, 400.0),
            separator("s2", 550.0, 0.0, 400.0),
            separator("s3", 850.0, 0.0, 400.0),
            card("c1", "TRI-1", "Triton", 10.0, 60.0),
            card("c2", "TRI-2", "Triton", 310.0, 60.0),
            card("c3", "TRI-3", "Triton", 610.0, 200.0),
            card("k1", "KRA-1", "Kraken", 310.0, 1200.0),
        ])
    }

    #[test]
    fn bands_split_on_vertical_gaps() {
        let boundaries = detect_boundaries(&board(), &BoundaryTuning::default());
        assert_eq!(boundaries.bands.len(), 2);
        assert_eq!(boundaries.bands[0].team.name, "Triton");
        assert_eq!(boundaries.bands[0].team.range_end, 400.0);
        assert_eq!(boundaries.bands[1].team.name, "Kraken");
    }

    #[test]
    fn sprint_boundaries_come_from_nearest_separators() {
        let boundaries = detect_boundaries(&board(), &BoundaryTuning::default());
        let sprints = &boundaries.bands[0].sprints;
        let names: Vec<&str> = sprints.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Backlog", "2025-1", "2025-2"]);
        assert_eq!((sprints[1].range_start, sprints[1].range_end), (250.0, 550.0));
        assert!(sprints.iter().all(|s| !s.ambiguous));
    }

    #[test]
    fn missing_separator_falls_back_to_half_width() {
        let snapshot = GeometrySnapshot::new(vec![header("h", "Triton 2025-4", 1000.0, 0.0)]);
        let tuning = BoundaryTuning::default();
        let boundaries = detect_boundaries(&snapshot, &tuning);
        let sprint = &boundaries.bands[0].sprints[0];
        assert!(sprint.ambiguous);
        assert_eq!(sprint.range_start, 1100.0 - tuning.fallback_half_width);
        assert_eq!(sprint.range_end, 1100.0 + tuning.fallback_half_width);
        assert_eq!(boundaries.ambiguous_count(), 1);
    }

    #[test]
    fn wide_header_finds_separators_from_its_edges() {
        let tuning = BoundaryTuning::default();
        let width = tuning.max_separator_distance * 3.0;
        let mut wide = header("h-wide", "Backlog", 0.0, 0.0);
        wide.rect.width = width;
        let snapshot = GeometrySnapshot::new(vec![
            wide,
            separator("s0", -10.0, 0.0, 400.0),
            separator("s1", width + 10.0, 0.0, 400.0),
            card("far", "TRI-9", "Triton", width - 200.0, 60.0),
        ]);
        let boundaries = detect_boundaries(&snapshot, &tuning);
        let sprint = &boundaries.bands[0].sprints[0];
        assert!(!sprint.ambiguous);
        assert_eq!((sprint.range_start, sprint.range_end), (-10.0, width + 10.0));

        let far = classify_element(&boundaries, &snapshot.elements[3]);
        assert_eq!(far.sprint_key, Some(SprintKey::Backlog));
    }

    #[test]
    fn fallback_never_cuts_into_the_header() {
        let tuning = BoundaryTuning::default();
        let mut wide = header("h", "Triton 2025-4", 0.0, 0.0);
        wide.rect.width = 2000.0;
        let boundaries = detect_boundaries(&GeometrySnapshot::new(vec![wide]), &tuning);
        let sprint = &boundaries.bands[0].sprints[0];
        assert!(sprint.ambiguous);
        assert_eq!((sprint.range_start, sprint.range_end), (0.0, 2000.0));
    }

    #[test]
    fn elements_classify_by_containment() {
        let snapshot = board();
        let boundaries = detect_boundaries(&snapshot, &BoundaryTuning::default());
        let by_id: BTreeMap<String, ElementAssignment> = reclassify(&snapshot, &boundaries)
            .into_iter()
            .map(|a| (a.element_id.0.clone(), a))
            .collect();
        assert_eq!(by_id["c1"].sprint_key, Some(SprintKey::Backlog));
        assert_eq!(by_id["c2"].sprint_key.map(|k| k.to_string()).as_deref(), Some("2025-1"));
        assert_eq!(by_id["c3"].sprint_key.map(|k| k.to_string()).as_deref(), Some("2025-2"));
        assert_eq!(by_id["c3"].team.as_deref(), Some("Triton"));
        // The Kraken band has no headers.
        assert_eq!(by_id["k1"].team.as_deref(), Some("Kraken"));
        assert_eq!(by_id["k1"].sprint_key, None);
        assert!(!by_id["k1"].is_complete());
    }

    #[test]
    fn band_name_tie_is_unknown() {
        let snapshot = GeometrySnapshot::new(vec![
            card("a", "A-1", "Triton", 0.0, 0.0),
            card("b", "B-1", "Kraken", 200.0, 0.0),
        ]);
        let boundaries = detect_boundaries(&snapshot, &BoundaryTuning::default());
        assert_eq!(boundaries.bands[0].team.name, UNKNOWN_TEAM);
    }

    #[test]
    fn cards_are_never_headers() {
        let mut looks_like_header = card("c", "TRI-9", "Triton", 0.0, 0.0);
        looks_like_header.text = Some("2025-3".into());
        assert_eq!(header_key(&looks_like_header), None);

        let mut epic_label = header("e", "2025-3", 0.0, 0.0);
        epic_label.meta.is_epic_label = true;
        assert_eq!(header_key(&epic_label), None);

        let mut role_header = header("r", "GH 2025-3", 0.0, 0.0);
        role_header.meta.role = Some(ElementRole::SprintHeader);
        assert_eq!(header_key(&role_header), SprintKey::sprint(2025, 3));
    }

    #[test]
    fn detection_is_idempotent() {
        let snapshot = board();
        let tuning = BoundaryTuning::default();
        let first = detect_boundaries(&snapshot, &tuning);
        let second = detect_boundaries(&snapshot, &tuning);
        similar_asserts::assert_eq!(first, second);
        similar_asserts::assert_eq!(reclassify(&snapshot, &first), reclassify(&snapshot, &second));
    }
}
