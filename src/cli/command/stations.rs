//! Refresh the station directory cache and report what it holds.

use anyhow::Result;

use crate::{
    bom,
    cli::{create_progress_bar, StationsArgs},
    db::{default_db_path, Database},
};

pub async fn stations(args: &StationsArgs) -> Result<String> {
    let db_path = args.db.clone().unwrap_or_else(default_db_path);
    let mut db = Database::open(&db_path)?;

    let codes: Vec<u32> = match args.obs_code {
        Some(code) => vec![code],
        None => {
            let cached = db.cached_obs_codes()?;
            bom::OBS_CODES
                .iter()
                .copied()
                .filter(|code| !cached.contains(code))
                .collect()
        }
    };

    let pb = create_progress_bar(codes.len() as u64, "Fetching station lists...".to_string());
    let mut fetched = Vec::new();
    for code in &codes {
        let stations = bom::fetch_station_list(*code).await?;
        fetched.extend(stations);
        pb.inc(1);
    }
    pb.finish_with_message("Station lists downloaded");

    if !fetched.is_empty() {
        db.merge_and_replace(fetched)?;
    }

    for code in db.cached_obs_codes()? {
        println!(
            "obs code {} ({}): {} stations cached",
            code,
            bom::obs_code_description(code),
            db.stations(Some(code))?.len()
        );
    }

    Ok(db_path.to_string_lossy().to_string())
}
