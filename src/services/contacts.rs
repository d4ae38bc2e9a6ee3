// Contacts service
// Contacts joined with their interactions, each interaction carrying the
// name of the deal it was logged against.

use std::collections::HashMap;

use crate::backend::{select_as, Backend, BackendError, Select, Table};
use crate::filters::{filter_contacts, ContactFilter};
use crate::query_cache::{QueryKey, QueryState};
use crate::state::AppContext;
use crate::types::{Contact, ContactWithInteractions, Deal, DealRef, Interaction, LinkedInteraction};

pub const CONTACTS_KEY: &[&str] = &["contacts"];

const DEPENDENT_KEYS: &[&[&str]] = &[CONTACTS_KEY, &["dashboard"]];

/// Attach deal refs and group interactions under their contacts.
///
/// Contacts keep the order they came in; interactions keep theirs within each
/// contact. Interactions for unknown contacts are dropped, and a `deal_id`
/// with no matching deal leaves `deal` empty.
pub fn join_contacts(
    contacts: Vec<Contact>,
    interactions: Vec<Interaction>,
    deals: &[Deal],
) -> Vec<ContactWithInteractions> {
    let deal_names: HashMap<&str, &str> = deals
        .iter()
        .map(|d| (d.id.as_str(), d.project_name.as_str()))
        .collect();

    let mut by_contact: HashMap<String, Vec<LinkedInteraction>> = HashMap::new();
    for interaction in interactions {
        let deal = interaction.deal_id.as_deref().and_then(|id| {
            deal_names.get(id).map(|name| DealRef {
                id: id.to_string(),
                project_name: name.to_string(),
            })
        });
        by_contact
            .entry(interaction.contact_id.clone())
            .or_default()
            .push(LinkedInteraction { interaction, deal });
    }

    contacts
        .into_iter()
        .map(|contact| {
            let interactions = by_contact.remove(&contact.id).unwrap_or_default();
            ContactWithInteractions {
                contact,
                interactions,
            }
        })
        .collect()
}

async fn load_contacts(backend: &dyn Backend) -> Result<Vec<ContactWithInteractions>, BackendError> {
    let contacts_q = Select::from(Table::Contacts).order_by("created_at", false);
    let interactions_q = Select::from(Table::Interactions).order_by("interaction_date", false);

    let (contacts, interactions, deals) = tokio::join!(
        select_as::<Contact>(backend, &contacts_q),
        select_as::<Interaction>(backend, &interactions_q),
        super::deals::load_deals(backend),
    );

    Ok(join_contacts(contacts?, interactions?, &deals?))
}

/// All contacts, newest first, with interactions newest first.
pub async fn fetch_contacts(ctx: &AppContext) -> QueryState<Vec<ContactWithInteractions>> {
    let key = QueryKey::new(CONTACTS_KEY);
    let result = ctx
        .queries
        .fetch(&key, || load_contacts(ctx.backend.as_ref()))
        .await;
    super::settle(ctx, &key, result, "Failed to load contacts")
}

pub async fn fetch_filtered_contacts(
    ctx: &AppContext,
    filter: &ContactFilter,
) -> QueryState<Vec<ContactWithInteractions>> {
    let state = fetch_contacts(ctx).await;
    QueryState {
        data: filter_contacts(&state.data, filter),
        ..state
    }
}

pub fn invalidate_contacts(ctx: &AppContext) -> usize {
    DEPENDENT_KEYS
        .iter()
        .map(|prefix| ctx.queries.invalidate(prefix))
        .sum()
}

/// Delete a contact by id. Mirrors `delete_deal`: toast either way,
/// invalidate only on success.
pub async fn delete_contact(ctx: &AppContext, contact_id: &str) -> bool {
    let name = ctx
        .queries
        .get::<Vec<ContactWithInteractions>>(&QueryKey::new(CONTACTS_KEY))
        .and_then(|contacts| {
            contacts
                .iter()
                .find(|c| c.contact.id == contact_id)
                .map(|c| c.contact.name.clone())
        })
        .unwrap_or_else(|| contact_id.to_string());

    match ctx.backend.delete(Table::Contacts, contact_id).await {
        Ok(()) => {
            log::info!("Deleted contact {} ({})", contact_id, name);
            ctx.toaster.success(
                &ctx.t("Contact deleted"),
                &ctx.t_with("{name} has been removed.", &[("name", &name)]),
            );
            invalidate_contacts(ctx);
            true
        }
        Err(e) => {
            log::warn!("Failed to delete contact {}: {}", contact_id, e);
            ctx.toaster
                .error(&ctx.t("Failed to delete contact"), &e.to_string());
            false
        }
    }
}
