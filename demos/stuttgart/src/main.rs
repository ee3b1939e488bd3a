//! stuttgart — end-to-end walk through the pathfinder service.
//!
//! Loads `config.json` from the working directory (or the built-in
//! Stuttgart default), builds the first graph generation, answers a few
//! queries, and exercises reconfiguration.  Set `ONLY_CACHE=1` to stop after
//! the initial build.
//!
//! With `--features osm` and `PF_PBF=<extract.osm.pbf>` the regions are read
//! from a real OSM extract instead of the synthetic network.

mod network;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pf_core::RegionDescriptor;
use pf_service::config::DEFAULT_CONFIG_FILE;
use pf_service::{Coordinates, PathfinderService, ServiceConfig};
use pf_spatial::RegionSource;

use network::{stuttgart_source, HAUPTBAHNHOF, LB_SCHLOSS, LUDWIGSBURG_PLACE, NECKARPARK, VAIHINGEN};

fn region_source() -> Arc<dyn RegionSource> {
    #[cfg(feature = "osm")]
    if let Ok(path) = std::env::var("PF_PBF") {
        info!(%path, "serving regions from PBF extract");
        return Arc::new(pf_spatial::osm::PbfSource::new(path, stuttgart_gazetteer()));
    }
    Arc::new(stuttgart_source())
}

#[cfg(feature = "osm")]
fn stuttgart_gazetteer() -> pf_spatial::Gazetteer {
    use pf_service::config::{STUTTGART_BBOX, STUTTGART_PLACE};

    let [min_lat, min_lon, max_lat, max_lon] = STUTTGART_BBOX;
    pf_spatial::Gazetteer::new()
        .with_place(STUTTGART_PLACE, pf_core::BoundingBox { min_lat, min_lon, max_lat, max_lon })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    println!("=== stuttgart — pathfinder routing service ===");
    println!();

    // 1. Configuration.
    let config = ServiceConfig::load_or_default(Path::new(DEFAULT_CONFIG_FILE))?;
    println!("Regions: {}", config.locations.len());
    for region in &config.locations {
        println!("  {region}");
    }
    println!("Fallback speed: {} km/h", config.fallback_speed_kph);
    println!();

    // 2. Initial build.
    let t0 = Instant::now();
    let service = PathfinderService::start(region_source(), &config)?;
    let health = service.health();
    println!(
        "Generation {}: {} nodes, {} edges, {} components ({:.3} s)",
        health.epoch.unwrap_or(0),
        health.nodes,
        health.edges,
        health.components,
        t0.elapsed().as_secs_f64()
    );
    println!();

    if std::env::var("ONLY_CACHE").is_ok_and(|v| v == "1") {
        info!("ONLY_CACHE=1; exiting after the initial build");
        return Ok(());
    }

    // 3. Queries by node id.  The B14 wins on time, the Weinsteige on length.
    let response = service.shortest_path_by_id(HAUPTBAHNHOF, VAIHINGEN);
    println!("Hauptbahnhof → Vaihingen");
    println!("{}", serde_json::to_string_pretty(&response)?);
    println!();

    // The Neckarpark ramp is one-way; the return trip goes via Bad Cannstatt.
    let there = service.shortest_path_by_id(NECKARPARK, HAUPTBAHNHOF);
    let back  = service.shortest_path_by_id(HAUPTBAHNHOF, NECKARPARK);
    println!(
        "Neckarpark ⇄ Hauptbahnhof: {} / {} points by length",
        there.shortest_by_length.as_ref().map_or(0, Vec::len),
        back.shortest_by_length.as_ref().map_or(0, Vec::len)
    );

    // 4. Query by coordinates (Königstraße to Marienplatz).
    let response = service.shortest_path_by_coordinates(
        Coordinates { lat: 48.7800, lon: 9.1790 },
        Coordinates { lat: 48.7645, lon: 9.1675 },
    );
    println!("Königstraße → Marienplatz");
    println!("{}", serde_json::to_string(&response)?);
    println!();

    // 5. Ludwigsburg is not loaded yet.
    let response = service.shortest_path_by_id(HAUPTBAHNHOF, LB_SCHLOSS);
    println!("Hauptbahnhof → Ludwigsburg Schloss: {:?}", response.error);

    // 6. A broken reconfiguration leaves the current generation serving.
    if let Err(e) = service.reconfigure_json(r#"[{"type": "polygon", "points": []}]"#) {
        warn!(error = %e, "reconfiguration rejected");
    }
    println!("After failed reconfigure: epoch {:?}", service.health().epoch);

    // 7. Add Ludwigsburg.
    let mut locations = config.locations.clone();
    locations.push(RegionDescriptor::place(LUDWIGSBURG_PLACE));
    let epoch = service.reconfigure(locations)?;
    let health = service.health();
    println!("Generation {epoch}: {} nodes, {} edges", health.nodes, health.edges);

    let response = service.shortest_path_by_id(HAUPTBAHNHOF, LB_SCHLOSS);
    println!(
        "Hauptbahnhof → Ludwigsburg Schloss: {} points by travel time",
        response.shortest_by_travel_time.as_ref().map_or(0, Vec::len)
    );
    println!();

    // 8. Snapshot summary.
    let snapshot = service.graph_snapshot();
    let vertices = snapshot.vertices.unwrap_or_default();
    let edges = snapshot.edges.unwrap_or_default();
    let shape_points: usize = edges.iter().map(|line| line.len().saturating_sub(2)).sum();
    println!(
        "Snapshot: {} vertices, {} edge polylines, {} intermediate shape points",
        vertices.len(),
        edges.len(),
        shape_points
    );

    Ok(())
}
