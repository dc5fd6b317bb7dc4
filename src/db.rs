//! SQLite cache of the BoM station directory.
//!
//! One `stations` table, tagged by observation code. Refreshing merges the
//! newly fetched listings with whatever is cached and replaces the table
//! wholesale; there are no other persistence guarantees.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::error::Result;
use crate::reading::Station;

pub fn default_db_path() -> PathBuf {
    dirs::home_dir().unwrap().join("ausrain.sqlite")
}

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (creating if necessary) the cache database.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS stations (
                site TEXT NOT NULL,
                name TEXT NOT NULL,
                lat REAL,
                lon REAL,
                start TEXT,
                end TEXT,
                years REAL,
                percent INTEGER,
                aws INTEGER NOT NULL,
                obs_code INTEGER NOT NULL
            )",
            (),
        )?;

        Ok(Database { conn })
    }

    /// Observation codes with at least one cached station.
    pub fn cached_obs_codes(&self) -> Result<Vec<u32>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT obs_code FROM stations ORDER BY obs_code")?;
        let codes = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<u32>, _>>()?;

        Ok(codes)
    }

    /// All cached stations, optionally restricted to one observation code.
    pub fn stations(&self, obs_code: Option<u32>) -> Result<Vec<Station>> {
        let sql = "SELECT site, name, lat, lon, start, end, years, percent, aws, obs_code
                   FROM stations ORDER BY obs_code, site";
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], station_from_row)?;

        let mut stations = Vec::new();
        for station in rows {
            let station = station?;
            if obs_code.map_or(true, |code| station.obs_code == code) {
                stations.push(station);
            }
        }

        Ok(stations)
    }

    /// Looks up one cached station by site number (any observation code).
    pub fn find_station(&self, site: &str) -> Result<Option<Station>> {
        Ok(self
            .stations(None)?
            .into_iter()
            .find(|station| station.site == site))
    }

    /// Merges freshly fetched listings into the cache: cached rows for the
    /// refreshed observation codes are superseded, everything else is kept,
    /// and the table is replaced in one transaction.
    pub fn merge_and_replace(&mut self, fetched: Vec<Station>) -> Result<Vec<Station>> {
        let refreshed: HashSet<u32> = fetched.iter().map(|s| s.obs_code).collect();
        let mut merged: Vec<Station> = self
            .stations(None)?
            .into_iter()
            .filter(|station| !refreshed.contains(&station.obs_code))
            .collect();
        merged.extend(fetched);

        let tx = self.conn.transaction()?;
        tx.execute("DROP TABLE IF EXISTS stations", ())?;
        tx.execute(
            "CREATE TABLE stations (
                site TEXT NOT NULL,
                name TEXT NOT NULL,
                lat REAL,
                lon REAL,
                start TEXT,
                end TEXT,
                years REAL,
                percent INTEGER,
                aws INTEGER NOT NULL,
                obs_code INTEGER NOT NULL
            )",
            (),
        )?;
        for station in &merged {
            tx.execute(
                "INSERT INTO stations
                 (site, name, lat, lon, start, end, years, percent, aws, obs_code)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    station.site,
                    station.name,
                    station.lat,
                    station.lon,
                    station.start.map(|d| d.to_string()),
                    station.end.map(|d| d.to_string()),
                    station.years,
                    station.percent,
                    station.aws,
                    station.obs_code,
                ],
            )?;
        }
        tx.commit()?;

        Ok(merged)
    }
}

fn station_from_row(row: &rusqlite::Row) -> std::result::Result<Station, rusqlite::Error> {
    let start: Option<String> = row.get(4)?;
    let end: Option<String> = row.get(5)?;

    Ok(Station {
        site: row.get(0)?,
        name: row.get(1)?,
        lat: row.get(2)?,
        lon: row.get(3)?,
        start: start.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        end: end.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        years: row.get(6)?,
        percent: row.get(7)?,
        aws: row.get(8)?,
        obs_code: row.get(9)?,
    })
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use super::*;
    use tempfile::TempDir;

    fn station(site: &str, obs_code: u32) -> Station {
        Station {
            site: site.to_string(),
            name: format!("STATION {}", site),
            lat: Some(-34.9),
            lon: Some(138.6),
            start: NaiveDate::from_ymd_opt(1884, 1, 1),
            end: None,
            years: Some(72.0),
            percent: Some(98),
            aws: false,
            obs_code,
        }
    }

    #[test]
    fn should_replace_and_query_stations() {
        let tmp_dir = TempDir::new().unwrap();
        let mut db = Database::open(&tmp_dir.path().join("cache.sqlite")).unwrap();

        db.merge_and_replace(vec![station("023000", 136), station("023343", 136)])
            .unwrap();

        let cached = db.stations(Some(136)).unwrap();
        assert_eq!(cached.len(), 2);
        assert_eq!(cached[0].site, "023000");
        assert_eq!(cached[0].start, NaiveDate::from_ymd_opt(1884, 1, 1));
        assert_eq!(db.cached_obs_codes().unwrap(), vec![136]);
    }

    #[test]
    fn should_keep_other_obs_codes_on_refresh() {
        let tmp_dir = TempDir::new().unwrap();
        let mut db = Database::open(&tmp_dir.path().join("cache.sqlite")).unwrap();

        db.merge_and_replace(vec![station("023000", 136)]).unwrap();
        db.merge_and_replace(vec![station("023090", 122)]).unwrap();
        // refreshing 136 supersedes its old rows but not the 122 listing
        db.merge_and_replace(vec![station("023343", 136)]).unwrap();

        assert_eq!(db.cached_obs_codes().unwrap(), vec![122, 136]);
        let rainfall = db.stations(Some(136)).unwrap();
        assert_eq!(rainfall.len(), 1);
        assert_eq!(rainfall[0].site, "023343");
    }

    #[test]
    fn should_find_station_by_site() {
        let tmp_dir = TempDir::new().unwrap();
        let mut db = Database::open(&tmp_dir.path().join("cache.sqlite")).unwrap();
        db.merge_and_replace(vec![station("023000", 136)]).unwrap();

        assert!(db.find_station("023000").unwrap().is_some());
        assert!(db.find_station("999999").unwrap().is_none());
    }
}
