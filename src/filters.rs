//! Filtering, sorting, and pipeline stats over fetched deals and contacts.
//!
//! Everything here is pure: the hooks hand in the cached collection and a
//! filter and get back a new vector. All active predicates must hold
//! for an item to be kept. Sorts are stable, so items comparing equal keep
//! the order the backend returned them in.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::{ContactWithInteractions, Deal, DealStats, DealStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

/// Treat empty and `"all"` select values as "no filter".
pub fn choice(value: &str) -> Option<String> {
    let v = value.trim();
    if v.is_empty() || v.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(v.to_string())
    }
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

fn opt_contains_ci(haystack: Option<&str>, needle_lower: &str) -> bool {
    haystack.is_some_and(|h| contains_ci(h, needle_lower))
}

// =============================================================================
// Deals
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealSortField {
    #[default]
    DealDate,
    ProjectName,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealFilter {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub status: Option<DealStatus>,
    #[serde(default)]
    pub round: Option<String>,
    #[serde(default)]
    pub sort_by: DealSortField,
    #[serde(default)]
    pub direction: SortDirection,
}

/// True when `deal` passes every active predicate in `filter`.
pub fn deal_matches(deal: &Deal, filter: &DealFilter) -> bool {
    let needle = filter.search.trim().to_lowercase();
    let search_ok = needle.is_empty()
        || contains_ci(&deal.project_name, &needle)
        || opt_contains_ci(deal.description.as_deref(), &needle)
        || opt_contains_ci(deal.sector.as_deref(), &needle);

    let sector_ok = filter
        .sector
        .as_deref()
        .map_or(true, |s| deal.sector.as_deref() == Some(s));
    let status_ok = filter.status.map_or(true, |s| deal.status == s);
    let round_ok = filter
        .round
        .as_deref()
        .map_or(true, |r| deal.funding_round.as_deref() == Some(r));

    search_ok && sector_ok && status_ok && round_ok
}

fn compare_deals(a: &Deal, b: &Deal, field: DealSortField) -> Ordering {
    match field {
        // Undated deals sort before every dated one.
        DealSortField::DealDate => a.deal_date.cmp(&b.deal_date),
        DealSortField::ProjectName => a
            .project_name
            .to_lowercase()
            .cmp(&b.project_name.to_lowercase()),
    }
}

pub fn filter_deals(deals: &[Deal], filter: &DealFilter) -> Vec<Deal> {
    let mut out: Vec<Deal> = deals
        .iter()
        .filter(|d| deal_matches(d, filter))
        .cloned()
        .collect();
    out.sort_by(|a, b| filter.direction.apply(compare_deals(a, b, filter.sort_by)));
    out
}

/// Pipeline counts: `following` is Follow, `active` is Due Diligence, and
/// `closed` is any terminal status. Unknown statuses count toward the total
/// only.
pub fn deal_stats(deals: &[Deal]) -> DealStats {
    deals.iter().fold(
        DealStats {
            total: deals.len(),
            ..DealStats::default()
        },
        |mut stats, deal| {
            match deal.status {
                DealStatus::Follow => stats.following += 1,
                DealStatus::DueDiligence => stats.active += 1,
                s if s.is_closed() => stats.closed += 1,
                _ => {}
            }
            stats
        },
    )
}

fn distinct<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<String> {
    let mut out: Vec<String> = values
        .flatten()
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
        .collect();
    out.sort();
    out.dedup();
    out
}

/// Sector options for the filter dropdown.
pub fn deal_sectors(deals: &[Deal]) -> Vec<String> {
    distinct(deals.iter().map(|d| d.sector.as_deref()))
}

/// Funding-round options for the filter dropdown.
pub fn deal_rounds(deals: &[Deal]) -> Vec<String> {
    distinct(deals.iter().map(|d| d.funding_round.as_deref()))
}

// =============================================================================
// Contacts
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactSortField {
    Name,
    #[default]
    CreatedAt,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactFilter {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub contact_type: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub sort_by: ContactSortField,
    #[serde(default)]
    pub direction: SortDirection,
}

pub fn contact_matches(entry: &ContactWithInteractions, filter: &ContactFilter) -> bool {
    let contact = &entry.contact;
    let needle = filter.search.trim().to_lowercase();
    let search_ok = needle.is_empty()
        || contains_ci(&contact.name, &needle)
        || opt_contains_ci(contact.company.as_deref(), &needle)
        || opt_contains_ci(contact.email.as_deref(), &needle)
        || opt_contains_ci(contact.notes.as_deref(), &needle)
        || contact.tags.iter().any(|t| contains_ci(t, &needle))
        || entry
            .interactions
            .iter()
            .any(|i| opt_contains_ci(i.interaction.notes.as_deref(), &needle));

    let type_ok = filter
        .contact_type
        .as_deref()
        .map_or(true, |t| contact.contact_type.as_deref() == Some(t));
    let tag_ok = filter
        .tag
        .as_deref()
        .map_or(true, |t| contact.tags.iter().any(|ct| ct == t));

    search_ok && type_ok && tag_ok
}

pub fn filter_contacts(
    contacts: &[ContactWithInteractions],
    filter: &ContactFilter,
) -> Vec<ContactWithInteractions> {
    let mut out: Vec<ContactWithInteractions> = contacts
        .iter()
        .filter(|c| contact_matches(c, filter))
        .cloned()
        .collect();
    out.sort_by(|a, b| {
        let ord = match filter.sort_by {
            ContactSortField::Name => a
                .contact
                .name
                .to_lowercase()
                .cmp(&b.contact.name.to_lowercase()),
            ContactSortField::CreatedAt => a.contact.created_at.cmp(&b.contact.created_at),
        };
        filter.direction.apply(ord)
    });
    out
}

/// Tag options for the contact filter, across every contact.
pub fn contact_tags(contacts: &[ContactWithInteractions]) -> Vec<String> {
    distinct(
        contacts
            .iter()
            .flat_map(|c| c.contact.tags.iter().map(|t| Some(t.as_str()))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Contact, Interaction, LinkedInteraction};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn deal(id: &str, date: Option<&str>, status: DealStatus) -> Deal {
        Deal {
            id: id.to_string(),
            project_name: format!("Project {}", id),
            sector: None,
            funding_round: None,
            status,
            valuation: None,
            description: None,
            deal_date: date.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").expect("date")),
            created_at: None,
        }
    }

    fn sample_deals() -> Vec<Deal> {
        let mut a = deal("a", Some("2024-01-01"), DealStatus::Follow);
        a.project_name = "NeuralForge".to_string();
        a.sector = Some("AI Infrastructure".to_string());
        a.funding_round = Some("Seed".to_string());
        a.description = Some("GPU scheduling for inference".to_string());

        let mut b = deal("b", Some("2024-03-01"), DealStatus::DueDiligence);
        b.project_name = "BioSynth".to_string();
        b.sector = Some("Biotech".to_string());
        b.funding_round = Some("Series A".to_string());

        let mut c = deal("c", None, DealStatus::Invested);
        c.project_name = "ChipWorks".to_string();
        c.sector = Some("AI Infrastructure".to_string());
        c.funding_round = Some("Series A".to_string());

        let d = deal("d", Some("2023-06-10"), DealStatus::Reject);
        vec![a, b, c, d]
    }

    fn contact(id: &str, name: &str) -> ContactWithInteractions {
        ContactWithInteractions {
            contact: Contact {
                id: id.to_string(),
                name: name.to_string(),
                company: None,
                email: None,
                tags: Vec::new(),
                notes: None,
                contact_type: None,
                created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            },
            interactions: Vec::new(),
        }
    }

    #[test]
    fn test_sort_by_deal_date_desc_then_asc() {
        let deals = vec![
            deal("jan", Some("2024-01-01"), DealStatus::Follow),
            deal("mar", Some("2024-03-01"), DealStatus::Follow),
        ];
        let mut filter = DealFilter::default();
        let out = filter_deals(&deals, &filter);
        assert_eq!(out[0].id, "mar");

        filter.direction = SortDirection::Asc;
        let out = filter_deals(&deals, &filter);
        assert_eq!(out[0].id, "jan");
    }

    #[test]
    fn test_filtered_deals_are_subset_satisfying_all_predicates() {
        let deals = sample_deals();
        let filters = [
            DealFilter {
                sector: Some("AI Infrastructure".to_string()),
                ..DealFilter::default()
            },
            DealFilter {
                sector: Some("AI Infrastructure".to_string()),
                round: Some("Series A".to_string()),
                ..DealFilter::default()
            },
            DealFilter {
                status: Some(DealStatus::DueDiligence),
                search: "bio".to_string(),
                ..DealFilter::default()
            },
            DealFilter {
                search: "gpu".to_string(),
                ..DealFilter::default()
            },
            DealFilter {
                search: "nothing-matches".to_string(),
                ..DealFilter::default()
            },
        ];

        for filter in &filters {
            let out = filter_deals(&deals, filter);
            assert!(out.len() <= deals.len());
            for d in &out {
                assert!(deals.contains(d));
                assert!(deal_matches(d, filter));
            }
            // Nothing that matches was dropped.
            let expected = deals.iter().filter(|d| deal_matches(d, filter)).count();
            assert_eq!(out.len(), expected);
        }

        let out = filter_deals(&deals, &filters[1]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "c");
        assert_eq!(filter_deals(&deals, &filters[3])[0].id, "a");
        assert!(filter_deals(&deals, &filters[4]).is_empty());
    }

    #[test]
    fn test_undated_deals_sort_last_when_descending() {
        let out = filter_deals(&sample_deals(), &DealFilter::default());
        let ids: Vec<&str> = out.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "d", "c"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let deals = vec![
            deal("first", Some("2024-01-01"), DealStatus::Follow),
            deal("second", Some("2024-01-01"), DealStatus::Pass),
        ];
        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let filter = DealFilter {
                direction,
                ..DealFilter::default()
            };
            let out = filter_deals(&deals, &filter);
            assert_eq!(out[0].id, "first");
        }
    }

    #[test]
    fn test_sort_by_project_name_ignores_case() {
        let mut deals = sample_deals();
        deals[3].project_name = "alpha".to_string();
        let filter = DealFilter {
            sort_by: DealSortField::ProjectName,
            direction: SortDirection::Asc,
            ..DealFilter::default()
        };
        let names: Vec<String> = filter_deals(&deals, &filter)
            .into_iter()
            .map(|d| d.project_name)
            .collect();
        assert_eq!(names, vec!["alpha", "BioSynth", "ChipWorks", "NeuralForge"]);
    }

    #[test]
    fn test_deal_stats_by_status_membership() {
        let mut deals = sample_deals();
        deals.push(deal("e", None, DealStatus::Pass));
        deals.push(deal("f", None, DealStatus::Unknown));
        let stats = deal_stats(&deals);
        assert_eq!(
            stats,
            DealStats {
                total: 6,
                following: 1,
                active: 1,
                closed: 3,
            }
        );
    }

    #[test]
    fn test_choice_treats_all_as_no_filter() {
        assert_eq!(choice("all"), None);
        assert_eq!(choice(" ALL "), None);
        assert_eq!(choice(""), None);
        assert_eq!(choice("Seed"), Some("Seed".to_string()));
    }

    #[test]
    fn test_dropdown_options_are_sorted_and_distinct() {
        let deals = sample_deals();
        assert_eq!(deal_sectors(&deals), vec!["AI Infrastructure", "Biotech"]);
        assert_eq!(deal_rounds(&deals), vec!["Seed", "Series A"]);
    }

    #[test]
    fn test_contact_search_bio() {
        let contacts = vec![contact("1", "BioCorp"), contact("2", "Acme")];
        let filter = ContactFilter {
            search: "bio".to_string(),
            ..ContactFilter::default()
        };
        let out = filter_contacts(&contacts, &filter);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].contact.name, "BioCorp");
    }

    #[test]
    fn test_contact_search_covers_tags_and_interaction_notes() {
        let mut tagged = contact("1", "Ada");
        tagged.contact.tags = vec!["LP".to_string(), "Robotics".to_string()];
        let mut noted = contact("2", "Grace");
        noted.interactions.push(LinkedInteraction {
            interaction: Interaction {
                id: "i1".to_string(),
                contact_id: "2".to_string(),
                deal_id: None,
                notes: Some("Discussed robotics fund II".to_string()),
                interaction_date: NaiveDate::from_ymd_opt(2024, 2, 2).expect("date"),
            },
            deal: None,
        });
        let plain = contact("3", "Linus");

        let contacts = vec![tagged, noted, plain];
        let filter = ContactFilter {
            search: "ROBOTICS".to_string(),
            sort_by: ContactSortField::Name,
            direction: SortDirection::Asc,
            ..ContactFilter::default()
        };
        let names: Vec<String> = filter_contacts(&contacts, &filter)
            .into_iter()
            .map(|c| c.contact.name)
            .collect();
        assert_eq!(names, vec!["Ada", "Grace"]);

        let by_tag = ContactFilter {
            tag: Some("LP".to_string()),
            ..ContactFilter::default()
        };
        assert_eq!(filter_contacts(&contacts, &by_tag).len(), 1);
        assert_eq!(contact_tags(&contacts), vec!["LP", "Robotics"]);
    }
}
