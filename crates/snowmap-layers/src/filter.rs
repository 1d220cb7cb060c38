//! Filter engine
//!
//! Pure category-membership filters. Tombstoned entities never pass.

use chrono::Duration;
use snowmap_types::{Catalog, Contribution, FilterSelection, Segment, Timestamp};

/// Keep segments whose maintenance category is selected.
pub fn filter_segments<'a>(segments: &'a [Segment], selection: &FilterSelection) -> Vec<&'a Segment> {
    segments
        .iter()
        .filter(|s| !s.deleted && selection.shows_segment_type(s.segment_type()))
        .collect()
}

/// Keep contributions whose category is selected.
///
/// The day window only applies to the catalog's snow-report category; every
/// other category ignores `from_days` once its type is selected.
pub fn filter_contributions<'a>(
    contributions: &'a [Contribution],
    selection: &FilterSelection,
    catalog: &Catalog,
    now: Timestamp,
) -> Vec<&'a Contribution> {
    // A window reaching past the representable range has no cutoff.
    let cutoff = selection.from_days().and_then(|days| {
        Duration::try_days(i64::from(days)).and_then(|window| now.checked_sub_signed(window))
    });

    contributions
        .iter()
        .filter(|c| {
            if c.deleted || !selection.shows_contribution_type(c.issue_type_id) {
                return false;
            }
            match cutoff {
                Some(cutoff) if c.issue_type_id == catalog.snow_report_type_id => {
                    c.created_at >= cutoff
                }
                _ => true,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use snowmap_types::{ContributionId, GeoPoint, IssueTypeId, SegmentId, SegmentType};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 1, 20, 12, 0, 0).unwrap()
    }

    fn segment(id: u64, winter: bool, winter_protected: bool) -> Segment {
        Segment {
            id: SegmentId::new(id),
            geometry: vec![GeoPoint::new(-73.6, 45.5), GeoPoint::new(-73.61, 45.51)],
            side_one_state: Some(1),
            side_two_state: Some(1),
            winter,
            winter_protected,
            name: None,
            length: None,
            updated_at: now(),
            deleted: false,
        }
    }

    fn contribution(id: u64, issue_type: u32, age_days: i64) -> Contribution {
        let created_at = now() - Duration::days(age_days);
        Contribution {
            id: ContributionId::new(id),
            issue_type_id: IssueTypeId::new(issue_type),
            quality: None,
            coords: Some(GeoPoint::new(-73.6, 45.5)),
            comment: None,
            name: None,
            score: 0,
            replies: 0,
            created_at,
            updated_at: created_at,
            deleted: false,
        }
    }

    #[test]
    fn test_filter_segments_by_maintenance_type() {
        let segments = vec![
            segment(1, true, true),
            segment(2, true, false),
            segment(3, false, false),
        ];
        let selection = FilterSelection::default()
            .with_segment_types([SegmentType::WinterProtected, SegmentType::Uncleared]);

        let ids: Vec<_> = filter_segments(&segments, &selection)
            .iter()
            .map(|s| s.id.get())
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_filter_segments_ignores_clearance_state() {
        let mut s = segment(1, true, false);
        s.side_one_state = Some(0);
        s.side_two_state = None;
        let segments = vec![s];
        let selection = FilterSelection::default().with_segment_types([SegmentType::Winter]);
        assert_eq!(filter_segments(&segments, &selection).len(), 1);
    }

    #[test]
    fn test_filter_segments_drops_deleted() {
        let mut s = segment(1, true, true);
        s.deleted = true;
        let segments = vec![s];
        let selection = FilterSelection::default().with_segment_types(SegmentType::ALL);
        assert!(filter_segments(&segments, &selection).is_empty());
    }

    #[test]
    fn test_filter_contributions_by_type() {
        let catalog = Catalog::default();
        let contributions = vec![contribution(1, 2, 0), contribution(2, 3, 0)];
        let selection = FilterSelection::default().with_contribution_types([IssueTypeId::new(3)]);

        let kept = filter_contributions(&contributions, &selection, &catalog, now());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, ContributionId::new(2));
    }

    // The day window only constrains snow reports. Keep this asymmetry.
    #[test]
    fn test_day_window_only_applies_to_snow_reports() {
        let catalog = Catalog::default();
        let snow = catalog.snow_report_type_id.get();
        let contributions = vec![contribution(1, snow, 10), contribution(2, 2, 10)];
        let selection = FilterSelection::all(&catalog).with_from_days(Some(3));

        let kept: Vec<_> = filter_contributions(&contributions, &selection, &catalog, now())
            .iter()
            .map(|c| c.id.get())
            .collect();
        assert_eq!(kept, vec![2]);
    }

    #[test]
    fn test_day_window_keeps_recent_snow_reports() {
        let catalog = Catalog::default();
        let snow = catalog.snow_report_type_id.get();
        let contributions = vec![contribution(1, snow, 1), contribution(2, snow, 3)];
        let selection = FilterSelection::all(&catalog).with_from_days(Some(3));

        // Exactly on the boundary still counts as within the window.
        assert_eq!(
            filter_contributions(&contributions, &selection, &catalog, now()).len(),
            2
        );
    }

    #[test]
    fn test_no_window_keeps_old_snow_reports() {
        let catalog = Catalog::default();
        let snow = catalog.snow_report_type_id.get();
        let contributions = vec![contribution(1, snow, 400)];
        let selection = FilterSelection::all(&catalog);
        assert_eq!(
            filter_contributions(&contributions, &selection, &catalog, now()).len(),
            1
        );
    }

    #[test]
    fn test_huge_day_window_keeps_everything() {
        let catalog = Catalog::default();
        let snow = catalog.snow_report_type_id.get();
        let contributions = vec![contribution(1, snow, 0), contribution(2, snow, 40_000)];

        for days in [200_000_000, u32::MAX] {
            let selection = FilterSelection::all(&catalog).with_from_days(Some(days));
            assert_eq!(
                filter_contributions(&contributions, &selection, &catalog, now()).len(),
                2
            );
        }
    }

    #[test]
    fn test_unselected_snow_report_excluded_even_when_recent() {
        let catalog = Catalog::default();
        let snow = catalog.snow_report_type_id;
        let contributions = vec![contribution(1, snow.get(), 0)];
        let mut selection = FilterSelection::all(&catalog);
        selection.set_contribution_type(snow, false);
        assert!(filter_contributions(&contributions, &selection, &catalog, now()).is_empty());
    }
}
