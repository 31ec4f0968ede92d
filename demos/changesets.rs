use std::collections::BTreeSet;

use anyhow::Result;
use osmchangesets::{BoundingBox, ChangesetQuery, Client, DEFAULT_LIMIT};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Example program that calls the library API.
    // Set OSM_API_URL or a `.osmchangesetsrc` file to target another server.
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("osmchangesets=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .init();

    let client = Client::from_env()?.with_progress(true);

    let latest = client.latest_changesets(DEFAULT_LIMIT)?;
    let users: BTreeSet<&str> = latest.iter().filter_map(|c| c.user.as_deref()).collect();
    println!(
        "Unique users: {} for the last {} changesets",
        users.into_iter().collect::<Vec<_>>().join(", "),
        latest.len()
    );

    let largest = latest
        .iter()
        .map(|c| (c, c.bounds.area()))
        .filter(|(_, area)| *area > 0.0)
        .max_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((changeset, area)) = largest {
        println!(
            "The largest changeset is {:?} with a bounding box area of {:.0} m²",
            changeset.osm_id, area
        );
    }

    let changeset = client.get_changeset(7053134)?;
    println!(
        "Changeset {:?} by {} has {} changes",
        changeset.osm_id,
        changeset.user.as_deref().unwrap_or("?"),
        changeset.changes_count
    );

    for changeset in client.get_changesets(&[1, 2, 3])? {
        println!(
            "Changeset {:?} by {} has {} changes",
            changeset.osm_id,
            changeset.user.as_deref().unwrap_or("?"),
            changeset.changes_count
        );
    }

    let netherlands: BoundingBox = "3.2,50.8,7.2,53.6".parse()?;
    let query = ChangesetQuery::new().display_name("mvexel").bbox(netherlands);
    let found = client.query_changesets(&query)?;
    if let (Some(newest), Some(oldest)) = (found.first(), found.last()) {
        println!(
            "user mvexel has {} changesets in the Netherlands, the oldest is from {:?} and the newest is from {:?}",
            found.len(),
            oldest.created_at,
            newest.created_at
        );
    }

    Ok(())
}
