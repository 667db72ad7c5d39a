//! End-to-end reshaping over an in-memory block: the path a deck takes for
//! one chart, minus the workbook file itself.

use anyhow::Result;
use tidy_sheet::{
    aggregate, join, reshape, AggregateOp, Datum, HeaderSpec, RawBlock, RawValue, TableSchema,
    TidyRow, TidyTable, ValueSpec,
};

fn row(values: &[&str]) -> Vec<RawValue> {
    values
        .iter()
        .map(|value| {
            if value.is_empty() {
                RawValue::Empty
            } else {
                RawValue::Text(value.to_string())
            }
        })
        .collect()
}

/// A regional incident table the way the source agency lays it out:
/// merged region cells, a year row over a category row, suppressed and
/// blank counts.
fn incident_block() -> Result<RawBlock> {
    Ok(RawBlock::new(
        "Table 1",
        (14, 1),
        vec![
            row(&["", "", "2019-20", "", "2020-21", ""]),
            row(&["", "", "Residential", "Non-Residential", "Residential", "Non-Residential"]),
            row(&["North", "Banyule", "1,234", "≤ 3", "1,190", "14"]),
            row(&["", "Darebin", "842", "—", "799", "11"]),
            row(&["", "Whittlesea", "657", "9", "702", ""]),
            row(&["South", "Kingston", "512", "6", "498", "8"]),
        ],
    )?)
}

#[test]
fn incident_table_reshapes_to_one_row_per_observation() -> Result<()> {
    let table = reshape(
        &incident_block()?,
        &HeaderSpec::new(vec!["financial year", "category"]),
        &["region".to_string(), "area".to_string()],
        &ValueSpec::Melt { name: "incidents".to_string() },
    )?;

    assert_eq!(table.len(), 4 * 4);
    assert_eq!(table.key_columns(), ["region", "area", "financial year", "category"]);

    // Merged region labels reach every observation
    let regions: Vec<&str> = table.rows().iter().map(|r| r.keys()[0].as_str()).collect();
    assert!(regions[..12].iter().all(|region| *region == "North"));
    assert!(regions[12..].iter().all(|region| *region == "South"));

    // Suppressed count takes its ceiling, dash and blank stay missing
    assert_eq!(table.rows()[1].values()[0], Datum::Number(3.0));
    assert_eq!(table.rows()[5].values()[0], Datum::Missing);
    assert_eq!(table.rows()[11].values()[0], Datum::Missing);
    Ok(())
}

#[test]
fn regional_totals_join_against_population_for_rates() -> Result<()> {
    let table = reshape(
        &incident_block()?,
        &HeaderSpec::new(vec!["financial year", "category"]),
        &["region".to_string(), "area".to_string()],
        &ValueSpec::Melt { name: "incidents".to_string() },
    )?;

    let by_region = aggregate(&table, &["region".to_string()], AggregateOp::Sum)?;
    assert_eq!(by_region.len(), 2);
    assert_eq!(by_region.rows()[0].keys(), ["North"]);
    assert_eq!(
        by_region.rows()[0].values()[0],
        Datum::Number(1234.0 + 3.0 + 1190.0 + 14.0 + 842.0 + 799.0 + 11.0 + 657.0 + 9.0 + 702.0)
    );

    let population = TidyTable::new(
        vec!["region".to_string()],
        vec!["population".to_string()],
        vec![TidyRow::new(vec!["North".to_string()], vec![Datum::Number(520_000.0)])],
    );
    let joined = join(&by_region, &population, &["region".to_string()])?;
    assert_eq!(joined.len(), 2);
    assert_eq!(joined.value_columns(), ["incidents", "population"]);
    assert_eq!(joined.rows()[0].values()[1], Datum::Number(520_000.0));
    assert_eq!(joined.rows()[1].values()[1], Datum::Missing);
    Ok(())
}

#[test]
fn yearly_means_round_for_display() -> Result<()> {
    let table = reshape(
        &incident_block()?,
        &HeaderSpec::new(vec!["financial year", "category"]),
        &["region".to_string(), "area".to_string()],
        &ValueSpec::Melt { name: "incidents".to_string() },
    )?;
    let means = aggregate(
        &table,
        &["financial year".to_string()],
        AggregateOp::Mean { precision: 1 },
    )?;
    assert_eq!(means.len(), 2);
    assert_eq!(means.rows()[0].keys(), ["2019-20"]);
    // 2019-20: 1234, 3, 842, missing, 657, 9, 512, 6 -> 7 present values
    let expected: f64 = (1234.0 + 3.0 + 842.0 + 657.0 + 9.0 + 512.0 + 6.0) / 7.0;
    let expected = (expected * 10.0).round() / 10.0;
    assert_eq!(means.rows()[0].values()[0], Datum::Number(expected));
    Ok(())
}

#[test]
fn schemas_and_records_round_trip_through_serde() -> Result<()> {
    let schema: TableSchema = serde_json::from_str(
        r#"{
            "sheet": "Table 1*",
            "range": "B15:G20",
            "header": { "dimensions": ["financial year", "category"] },
            "group_columns": ["region", "area"],
            "values": { "melt": { "name": "incidents" } }
        }"#,
    )?;
    let table = reshape(
        &incident_block()?,
        &schema.header,
        &schema.group_columns,
        &schema.values,
    )?;

    let records = serde_json::to_value(&table)?;
    let first = &records[0];
    assert_eq!(first["region"], "North");
    assert_eq!(first["area"], "Banyule");
    assert_eq!(first["financial year"], "2019-20");
    assert_eq!(first["category"], "residential");
    assert_eq!(first["incidents"], 1234.0);
    assert_eq!(records[5]["incidents"], serde_json::Value::Null);
    Ok(())
}
