use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use flight_fare_sim::config::cli::Command;
use flight_fare_sim::core::report::{self, OutputFormat};
use flight_fare_sim::core::search::{cheapest, SearchQuery};
use flight_fare_sim::domain::model::{LoginRequest, PassengerDetails, SignupRequest};
use flight_fare_sim::domain::ports::FlightApi;
use flight_fare_sim::utils::error::ErrorSeverity;
use flight_fare_sim::utils::{logger, validation::Validate};
use flight_fare_sim::{
    BookingEngine, CliConfig, FareInputs, FileSessionStore, HttpFlightApi, SessionContext, Settings,
    SimError,
};
use serde::Serialize;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();
    let settings = cli.settings().context("failed to load configuration")?;

    if settings.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("Settings: {:?}", settings);

    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    if let Err(e) = run(cli, settings).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low | ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run(cli: CliConfig, settings: Settings) -> flight_fare_sim::Result<()> {
    let format = cli.format;
    let now = Utc::now();

    if let Command::Quote {
        base_fare,
        seats_left,
        total_seats,
        days_until,
    } = cli.command
    {
        let inputs = FareInputs::new(base_fare, seats_left, total_seats, days_until)
            .with_demand_index(settings.demand_index);
        #[derive(Serialize)]
        struct Quoted {
            inputs: FareInputs,
            price: i64,
        }
        let quoted = Quoted {
            inputs,
            price: inputs.price(),
        };
        return emit(&quoted, format, || quoted.price.to_string());
    }

    let api = HttpFlightApi::from_config(&settings)?;
    let engine = BookingEngine::with_demand_index(api, settings.demand_index);
    let mut session = SessionContext::new(FileSessionStore::new(&settings.session_path));
    session.load().await?;

    match cli.command {
        Command::Quote { .. } => {}
        Command::Search {
            from,
            to,
            date,
            sort_by,
            order,
            skip,
            limit,
        } => {
            let query = SearchQuery {
                origin: from,
                destination: to,
                travel_date: date
                    .as_deref()
                    .map(SearchQuery::parse_travel_date)
                    .transpose()?,
                sort_by,
                order,
                skip,
                limit,
            };
            let flights = engine.search(&query, now).await?;
            if flights.is_empty() && format == OutputFormat::Table {
                println!("No flights found.");
            } else {
                println!("{}", report::render_flights(&flights, format)?);
                if let (OutputFormat::Table, Some(best)) = (format, cheapest(&flights)) {
                    println!(
                        "\nCheapest: {} ({}) at {}",
                        best.flight.flight_number,
                        best.flight.route_label(),
                        best.quote.price
                    );
                }
            }
        }
        Command::Flights { skip, limit } => {
            let flights = engine.browse(skip, limit, now).await?;
            println!("{}", report::render_flights(&flights, format)?);
        }
        Command::Flight { flight_id } => {
            let priced = engine.quote(flight_id, now).await?;
            println!("{}", report::render_flights(&[priced], format)?);
        }
        Command::Seats { flight_id } => {
            let seats = engine.seats(flight_id).await?;
            emit(&seats, format, || {
                let mut text = format!(
                    "Flight {}: {}/{} seats available",
                    seats.flight_id, seats.available_seats, seats.total_seats
                );
                if !seats.unavailable_seats.is_empty() {
                    text.push_str(&format!("\nUnavailable: {}", seats.unavailable_seats.join(" ")));
                }
                text
            })?;
        }
        Command::Price { flight_id } => {
            let price = engine.api().get_price(flight_id).await?;
            emit(&price, format, || {
                format!(
                    "{}: {:.0} (base fare {:.0}, {} seats left)",
                    price.flight_number, price.dynamic_price, price.base_fare, price.available_seats
                )
            })?;
        }
        Command::History { flight_id } => {
            let points = engine.api().fare_history(flight_id).await?;
            println!("{}", report::render_fare_history(&points, format)?);
        }
        Command::Airports => {
            let airports = engine.api().list_airports().await?;
            emit(&airports, format, || {
                airports
                    .iter()
                    .map(|a| {
                        format!(
                            "{:>4}  {}, {}",
                            a.airport_id,
                            a.city.as_deref().unwrap_or("?"),
                            a.country.as_deref().unwrap_or("?")
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }
        Command::Signup {
            name,
            email,
            phone,
            password,
        } => {
            let request = SignupRequest {
                full_name: name,
                email,
                phone,
                password,
            };
            let passenger = engine.api().signup(&request).await?;
            emit(&passenger, format, || {
                format!(
                    "✅ Account created for {} (passenger {}). Run `fare-sim login` to continue.",
                    passenger.full_name, passenger.passenger_id
                )
            })?;
        }
        Command::Login { email, password } => {
            let passenger = engine.api().login(&LoginRequest { email, password }).await?;
            session.login_success(passenger).await?;
            if let Some(p) = session.current() {
                emit(p, format, || format!("✅ Logged in as {}", p.full_name))?;
            }
        }
        Command::Logout => {
            session.logout().await?;
            println!("Logged out.");
        }
        Command::Whoami => match session.current() {
            Some(p) => emit(p, format, || {
                format!("{} <{}> (passenger {})", p.full_name, p.email, p.passenger_id)
            })?,
            None => println!("Not logged in."),
        },
        Command::Book { flight_id, seats } => {
            let bookings = match engine.book(&session, flight_id, &seats, now).await {
                Ok(bookings) => bookings,
                Err(SimError::PartialBooking { booked, source }) => {
                    println!("{}", report::render_bookings(&booked, format)?);
                    return Err(SimError::PartialBooking { booked, source });
                }
                Err(e) => return Err(e),
            };
            println!("{}", report::render_bookings(&bookings, format)?);
        }
        Command::Booking { pnr } => {
            let booking = engine.api().get_booking(&pnr).await?;
            println!("{}", report::render_bookings(&[booking], format)?);
        }
        Command::Pay { pnr } => {
            let outcome = engine.pay(&pnr).await?;
            emit(&outcome, format, || {
                format!("{}: PNR {} is {}", outcome.message, outcome.pnr, outcome.status)
            })?;
        }
        Command::Cancel { pnr } => {
            let outcome = engine.cancel(&pnr).await?;
            emit(&outcome, format, || format!("{}: {}", outcome.pnr, outcome.message))?;
        }
        Command::Bookings => {
            let bookings = engine.my_bookings(&session).await?;
            if bookings.is_empty() && format == OutputFormat::Table {
                println!("No bookings found.");
            } else {
                println!("{}", report::render_bookings(&bookings, format)?);
            }
        }
        Command::Breakdown {
            outbound_flight,
            return_flight,
            passengers,
        } => {
            let passengers = passengers
                .into_iter()
                .map(|full_name| PassengerDetails {
                    full_name,
                    age: None,
                    gender: None,
                })
                .collect();
            let breakdown = engine
                .breakdown(outbound_flight, return_flight, passengers, now)
                .await?;
            println!("{}", report::render_breakdown(&breakdown, format)?);
        }
    }

    Ok(())
}

/// Prints `value` as pretty JSON, or the human text for every other format.
fn emit<T: Serialize + ?Sized>(
    value: &T,
    format: OutputFormat,
    text: impl FnOnce() -> String,
) -> flight_fare_sim::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        _ => println!("{}", text()),
    }
    Ok(())
}
