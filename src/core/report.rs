use crate::core::fares::FareBreakdown;
use crate::core::search::PricedFlight;
use crate::domain::model::{Booking, FarePoint};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Tsv,
    Json,
}

pub fn render_flights(flights: &[PricedFlight], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(flights)?);
    }

    let headers = [
        "flight_id",
        "flight",
        "airline",
        "route",
        "departure",
        "duration",
        "seats_left",
        "base_fare",
        "price",
        "price_source",
    ];
    let rows: Vec<Vec<String>> = flights
        .iter()
        .map(|p| {
            let f = &p.flight;
            let minutes = f.duration().num_minutes();
            vec![
                f.flight_id.to_string(),
                f.flight_number.clone(),
                f.airline_name.clone().unwrap_or_default(),
                f.route_label(),
                f.departure_time.format("%Y-%m-%d %H:%M").to_string(),
                format!("{}h {}m", minutes / 60, minutes % 60),
                format!("{}/{}", f.available_seats, f.total_seats),
                format!("{:.0}", f.base_fare),
                p.quote.price.to_string(),
                format!("{:?}", p.quote.source).to_lowercase(),
            ]
        })
        .collect();

    render_rows(&headers, &rows, format)
}

pub fn render_bookings(bookings: &[Booking], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(bookings)?);
    }

    let headers = ["pnr", "trip", "route", "date", "seats", "amount", "status"];
    let rows: Vec<Vec<String>> = bookings
        .iter()
        .map(|b| {
            let seats: Vec<&str> = b
                .passengers()
                .iter()
                .filter_map(|p| p.seat_no.as_deref())
                .collect();
            vec![
                b.pnr().unwrap_or("-").to_string(),
                if b.is_round_trip() { "round-trip" } else { "one-way" }.to_string(),
                b.route_label(),
                b.booking_date()
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                seats.join(" "),
                b.amount().map(|a| format!("{:.0}", a)).unwrap_or_default(),
                b.status().to_string(),
            ]
        })
        .collect();

    render_rows(&headers, &rows, format)
}

pub fn render_breakdown(breakdown: &FareBreakdown, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(breakdown)?);
    }

    let headers = ["passenger", "outbound", "return", "subtotal"];
    let mut rows: Vec<Vec<String>> = breakdown
        .lines
        .iter()
        .map(|line| {
            vec![
                line.passenger.clone(),
                line.outbound_fare.to_string(),
                line.return_fare.map(|f| f.to_string()).unwrap_or_default(),
                line.subtotal.to_string(),
            ]
        })
        .collect();
    rows.push(vec![
        "TOTAL".to_string(),
        String::new(),
        String::new(),
        breakdown.total.to_string(),
    ]);

    render_rows(&headers, &rows, format)
}

pub fn render_fare_history(points: &[FarePoint], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(points)?);
    }

    let headers = ["recorded_at", "price"];
    let rows: Vec<Vec<String>> = points
        .iter()
        .map(|p| {
            vec![
                p.recorded_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                format!("{:.2}", p.price),
            ]
        })
        .collect();

    render_rows(&headers, &rows, format)
}

fn render_rows(headers: &[&str], rows: &[Vec<String>], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Csv => delimited(headers, rows, b','),
        OutputFormat::Tsv => delimited(headers, rows, b'\t'),
        OutputFormat::Table | OutputFormat::Json => Ok(table(headers, rows)),
    }
}

fn delimited(headers: &[&str], rows: &[Vec<String>], delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = vec![pad_line(headers, &widths)];
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push(pad_line(&cells, &widths));
    }
    out.join("\n")
}

fn pad_line(cells: &[&str], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalize::normalize_bookings;
    use crate::core::pricing::{FareQuote, PriceSource};
    use crate::domain::model::Flight;
    use chrono::{Duration, TimeZone, Utc};

    fn priced() -> Vec<PricedFlight> {
        let departure_time = Utc.with_ymd_and_hms(2025, 11, 20, 8, 0, 0).unwrap();
        vec![PricedFlight {
            flight: Flight {
                flight_id: 7,
                flight_number: "AD123".to_string(),
                airline_id: None,
                airline_name: Some("Air Demo, Ltd".to_string()),
                source_airport: Some("Delhi".to_string()),
                destination_airport: Some("Mumbai".to_string()),
                departure_time,
                arrival_time: departure_time + Duration::minutes(130),
                base_fare: 3500.0,
                total_seats: 120,
                available_seats: 12,
                flight_type: None,
                travel_date: None,
                dynamic_price: None,
            },
            quote: FareQuote {
                price: 5408,
                source: PriceSource::Computed,
            },
        }]
    }

    #[test]
    fn test_flights_csv_quotes_commas() {
        let csv = render_flights(&priced(), OutputFormat::Csv).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("flight_id,flight,airline,route,departure,duration,seats_left,base_fare,price,price_source")
        );
        assert_eq!(
            lines.next(),
            Some("7,AD123,\"Air Demo, Ltd\",Delhi → Mumbai,2025-11-20 08:00,2h 10m,12/120,3500,5408,computed")
        );
    }

    #[test]
    fn test_flights_table_and_json() {
        let table = render_flights(&priced(), OutputFormat::Table).unwrap();
        assert!(table.lines().next().unwrap().starts_with("flight_id  flight"));
        assert!(table.contains("5408"));

        let json = render_flights(&priced(), OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["quote"]["price"], 5408);
        assert_eq!(parsed[0]["quote"]["source"], "computed");
    }

    #[test]
    fn test_bookings_tsv() {
        let bookings = normalize_bookings(serde_json::json!([
            { "pnr": "AB12CD34", "status": "CONFIRMED", "seat_no": "1A", "fare_paid": 5408.0,
              "source": "Delhi", "destination": "Mumbai", "booking_date": "2025-11-01T09:30:00" }
        ]))
        .unwrap();

        let tsv = render_bookings(&bookings, OutputFormat::Tsv).unwrap();
        assert_eq!(
            tsv.lines().nth(1),
            Some("AB12CD34\tone-way\tDelhi → Mumbai\t2025-11-01\t1A\t5408\tCONFIRMED")
        );
    }
}
