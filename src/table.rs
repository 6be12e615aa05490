//! Tabular rendering of the visible records.
//!
//! The table is always shown alongside the map and is the display of last
//! resort when no map scene can be produced.

use crate::Location;

/// Column headers, matching the upload format.
pub const TABLE_HEADER: [&str; 4] = ["nama", "lat", "lon", "kategori"];

/// Format records as display rows, one per record, in dataset order.
pub fn table_rows(records: &[Location]) -> Vec<[String; 4]> {
    records
        .iter()
        .map(|r| {
            [
                r.name.clone(),
                r.lat.to_string(),
                r.lon.to_string(),
                r.category.clone(),
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default_locations;

    #[test]
    fn test_rows_match_records() {
        let dataset = default_locations();
        let rows = table_rows(&dataset);

        assert_eq!(rows.len(), dataset.len());
        assert_eq!(rows[0][0], "Rektorat");
        assert_eq!(rows[0][1], "-5.147665");
        assert_eq!(rows[0][2], "119.432731");
        assert_eq!(rows[0][3], "Administrasi");
    }

    #[test]
    fn test_empty_dataset_empty_table() {
        assert!(table_rows(&[]).is_empty());
    }
}
