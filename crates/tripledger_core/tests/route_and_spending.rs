mod common;

use common::{approx_eq, at, expense, put_expense, put_stop, put_trip, stop, trip};
use tripledger_core::service::route_advisory::{
    INSUFFICIENT_GEO_TAGGED_MESSAGE, INSUFFICIENT_STOPS_MESSAGE, ROUTE_OPTIMIZED_MESSAGE,
};
use tripledger_core::service::spending::NO_TRIPS_MESSAGE;
use serde_json::Value;
use tripledger_core::collections::EXPENSES;
use tripledger_core::{
    AnalyticsConfig, AnalyticsError, AnalyticsService, Document, DocumentQuery, DocumentStore,
    DocumentTravelRepository, ExpenseCategory, ExpenseKind, MemoryDocumentStore, RepoError,
    RouteAdvisory, SpendingAnalysis, SqliteDocumentStore, StoreError, StoreResult,
};

const SAO_PAULO: [f64; 2] = [-23.55, -46.63];
const RIO: [f64; 2] = [-22.90, -43.17];
const SALVADOR: [f64; 2] = [-12.97, -38.50];

#[test]
fn nearby_stops_produce_the_optimized_message() {
    let store = SqliteDocumentStore::open_in_memory().unwrap();
    put_stop(&store, "s1", &stop("t1", "d1", "Sao Paulo", Some(SAO_PAULO), at(2024, 5, 1, 8)));
    put_stop(&store, "s2", &stop("t1", "d1", "Rio", Some(RIO), at(2024, 5, 1, 15)));
    let service = AnalyticsService::new(DocumentTravelRepository::new(store));

    match service.route_advisory("t1").unwrap() {
        RouteAdvisory::Advice(advice) => {
            assert_eq!(advice.total_stops, 2);
            assert_eq!(advice.geo_tagged_stops, 2);
            assert_eq!(advice.suggestions, vec![ROUTE_OPTIMIZED_MESSAGE.to_string()]);
            assert_eq!(advice.stops[0].name, "Sao Paulo");
            assert_eq!(advice.stops[1].coordinates, RIO);
        }
        other => panic!("unexpected advisory: {other:?}"),
    }
}

#[test]
fn long_leg_is_flagged_between_its_two_stops() {
    let store = MemoryDocumentStore::new();
    // Inserted out of order; arrival time decides the route order.
    put_stop(&store, "s3", &stop("t1", "d2", "C", Some(SALVADOR), at(2024, 5, 3, 18)));
    put_stop(&store, "s1", &stop("t1", "d1", "A", Some(SAO_PAULO), at(2024, 5, 1, 8)));
    put_stop(&store, "s2", &stop("t1", "d1", "B", None, at(2024, 5, 1, 15)));
    let service = AnalyticsService::new(DocumentTravelRepository::new(store));

    match service.route_advisory("t1").unwrap() {
        RouteAdvisory::Advice(advice) => {
            assert_eq!(advice.total_stops, 3);
            assert_eq!(advice.geo_tagged_stops, 2);
            assert_eq!(advice.suggestions.len(), 1);
            assert_eq!(
                advice.suggestions[0],
                "\"A\" and \"C\" are 1455 km apart; consider adding an intermediate stop"
            );
        }
        other => panic!("unexpected advisory: {other:?}"),
    }
}

#[test]
fn threshold_comes_from_configuration() {
    let store = MemoryDocumentStore::new();
    put_stop(&store, "s1", &stop("t1", "d1", "Sao Paulo", Some(SAO_PAULO), at(2024, 5, 1, 8)));
    put_stop(&store, "s2", &stop("t1", "d1", "Rio", Some(RIO), at(2024, 5, 1, 15)));
    let config = AnalyticsConfig {
        advisory_threshold_km: 100.0,
        ..AnalyticsConfig::default()
    };
    let service = AnalyticsService::with_config(DocumentTravelRepository::new(store), config);
    assert_eq!(service.config().advisory_threshold_km, 100.0);

    match service.route_advisory("t1").unwrap() {
        RouteAdvisory::Advice(advice) => {
            assert_eq!(advice.suggestions.len(), 1);
            assert_ne!(advice.suggestions[0], ROUTE_OPTIMIZED_MESSAGE);
        }
        other => panic!("unexpected advisory: {other:?}"),
    }
}

#[test]
fn fewer_than_two_stops_reports_the_actual_count() {
    let store = MemoryDocumentStore::new();
    put_stop(&store, "s1", &stop("t1", "d1", "Only", Some(RIO), at(2024, 5, 1, 8)));
    let service = AnalyticsService::new(DocumentTravelRepository::new(store));

    assert_eq!(
        service.route_advisory("t1").unwrap(),
        RouteAdvisory::InsufficientStops {
            message: INSUFFICIENT_STOPS_MESSAGE.to_string(),
            stop_count: 1,
        }
    );
    assert_eq!(
        service.route_advisory("no-such-trip").unwrap(),
        RouteAdvisory::InsufficientStops {
            message: INSUFFICIENT_STOPS_MESSAGE.to_string(),
            stop_count: 0,
        }
    );
}

#[test]
fn stops_without_coordinates_cannot_be_analyzed() {
    let store = MemoryDocumentStore::new();
    put_stop(&store, "s1", &stop("t1", "d1", "A", Some(RIO), at(2024, 5, 1, 8)));
    put_stop(&store, "s2", &stop("t1", "d1", "B", None, at(2024, 5, 1, 9)));
    store
        .insert(
            "paradas",
            Some("s3"),
            &serde_json::json!({
                "viagemId": "t1",
                "diaViagemId": "d1",
                "tipo": "meal",
                "nome": "C",
                "coordenadas": ["x", "y"],
                "horaChegada": at(2024, 5, 1, 10).timestamp_millis(),
            }),
        )
        .unwrap();
    let service = AnalyticsService::new(DocumentTravelRepository::new(store));

    let advisory = service.route_advisory("t1").unwrap();
    assert_eq!(
        advisory,
        RouteAdvisory::InsufficientGeoTagged {
            message: INSUFFICIENT_GEO_TAGGED_MESSAGE.to_string(),
            geo_tagged_stops: 1,
            total_stops: 3,
        }
    );
}

#[test]
fn traveler_without_trips_gets_no_trips_result() {
    let service = AnalyticsService::new(DocumentTravelRepository::new(MemoryDocumentStore::new()));

    let analysis = service.spending_patterns("nobody").unwrap();
    assert_eq!(analysis, SpendingAnalysis::no_trips());
    let json = serde_json::to_value(&analysis).unwrap();
    assert_eq!(json["mensagem"], NO_TRIPS_MESSAGE);
    assert_eq!(json["totalViagens"], 0);
}

#[test]
fn spending_rows_keep_trip_order_across_batches() {
    let store = MemoryDocumentStore::new();
    for index in 0..5u32 {
        let trip_id = format!("t{index}");
        let mut row = trip("u1", &format!("Trip {index}"), at(2024, 1, 1 + index, 8), 1);
        row.day_count = Some(2);
        put_trip(&store, &trip_id, &row);
        put_expense(
            &store,
            &format!("e{index}"),
            &expense(
                &trip_id,
                ExpenseCategory::Fuel,
                ExpenseKind::Real,
                100.0 * f64::from(index + 1),
                at(2024, 1, 1 + index, 10),
            ),
        );
    }
    put_trip(&store, "foreign", &trip("u2", "Not mine", at(2024, 1, 9, 8), 1));
    let config = AnalyticsConfig {
        max_parallel_reads: 2,
        ..AnalyticsConfig::default()
    };
    let service = AnalyticsService::with_config(DocumentTravelRepository::new(store), config);

    let SpendingAnalysis::Summary(summary) = service.spending_patterns("u1").unwrap() else {
        panic!("expected a spending summary");
    };
    assert_eq!(summary.trip_count, 5);
    // Newest trip first.
    let ids: Vec<&str> = summary.trips.iter().map(|row| row.trip_id.as_str()).collect();
    assert_eq!(ids, vec!["t4", "t3", "t2", "t1", "t0"]);
    assert!(approx_eq(summary.trips[0].total_spent, 500.0));
    assert!(approx_eq(summary.trips[0].spent_per_day, 250.0));
    assert!(approx_eq(summary.total_spent, 1500.0));
    assert!(approx_eq(summary.mean_per_trip, 300.0));
    assert!(approx_eq(summary.by_category[&ExpenseCategory::Fuel], 1500.0));
}

#[test]
fn spending_counts_only_real_expenses() {
    let store = SqliteDocumentStore::open_in_memory().unwrap();
    put_trip(&store, "t1", &trip("u1", "Serra", at(2024, 8, 1, 8), 2));
    put_expense(
        &store,
        "e1",
        &expense("t1", ExpenseCategory::Food, ExpenseKind::Real, 80.0, at(2024, 8, 1, 12)),
    );
    put_expense(
        &store,
        "e2",
        &expense("t1", ExpenseCategory::Food, ExpenseKind::Planned, 400.0, at(2024, 8, 1, 12)),
    );
    let service = AnalyticsService::new(DocumentTravelRepository::new(store));

    let SpendingAnalysis::Summary(summary) = service.spending_patterns("u1").unwrap() else {
        panic!("expected a spending summary");
    };
    assert!(approx_eq(summary.total_spent, 80.0));
    assert_eq!(summary.trips[0].day_count, 0);
    assert!(approx_eq(summary.trips[0].spent_per_day, 80.0));
}

#[test]
fn spending_storage_failure_fails_the_whole_analysis() {
    let store = MemoryDocumentStore::new();
    put_trip(&store, "t1", &trip("u1", "Serra", at(2024, 8, 1, 8), 2));
    store.fail_with(Some("offline"));
    let service = AnalyticsService::new(DocumentTravelRepository::new(&store));

    let err = service.spending_patterns("u1").unwrap_err();
    assert!(matches!(
        err,
        AnalyticsError::Repo(RepoError::Store(StoreError::Unavailable(message))) if message == "offline"
    ));
}

enum ExpenseReadFault {
    Fail,
    Panic,
}

/// Store that breaks expense reads for selected trips only.
struct FaultyExpenseStore {
    inner: MemoryDocumentStore,
    broken_trips: Vec<&'static str>,
    fault: ExpenseReadFault,
}

impl FaultyExpenseStore {
    fn broken_trip(&self, collection: &str, query: &DocumentQuery) -> Option<&'static str> {
        if collection != EXPENSES {
            return None;
        }
        query.filters.iter().find_map(|filter| match &filter.value {
            Value::String(trip_id) if filter.field == "viagemId" => self
                .broken_trips
                .iter()
                .copied()
                .find(|broken| *broken == trip_id.as_str()),
            _ => None,
        })
    }
}

impl DocumentStore for FaultyExpenseStore {
    fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Document>> {
        self.inner.get(collection, key)
    }

    fn query(&self, collection: &str, query: &DocumentQuery) -> StoreResult<Vec<Document>> {
        match (self.broken_trip(collection, query), &self.fault) {
            (Some(trip_id), ExpenseReadFault::Fail) => {
                Err(StoreError::Unavailable(format!("down {trip_id}")))
            }
            (Some(trip_id), ExpenseReadFault::Panic) => panic!("expense read crashed for {trip_id}"),
            (None, _) => self.inner.query(collection, query),
        }
    }
}

fn four_trip_service(
    broken_trips: Vec<&'static str>,
    fault: ExpenseReadFault,
) -> AnalyticsService<DocumentTravelRepository<FaultyExpenseStore>> {
    let inner = MemoryDocumentStore::new();
    for index in 0..4u32 {
        let trip_id = format!("t{index}");
        put_trip(&inner, &trip_id, &trip("u1", &trip_id, at(2024, 2, 1 + index, 8), 1));
        put_expense(
            &inner,
            &format!("e{index}"),
            &expense(&trip_id, ExpenseCategory::Food, ExpenseKind::Real, 10.0, at(2024, 2, 1 + index, 12)),
        );
    }
    let store = FaultyExpenseStore {
        inner,
        broken_trips,
        fault,
    };
    let config = AnalyticsConfig {
        max_parallel_reads: 2,
        ..AnalyticsConfig::default()
    };
    AnalyticsService::with_config(DocumentTravelRepository::new(store), config)
}

#[test]
fn first_failed_expense_read_in_trip_order_fails_spending() {
    // Trip order is t3, t2, t1, t0, so t1 fails before t0.
    let service = four_trip_service(vec!["t0", "t1"], ExpenseReadFault::Fail);

    let err = service.spending_patterns("u1").unwrap_err();
    assert!(!err.is_not_found());
    assert!(matches!(
        err,
        AnalyticsError::Repo(RepoError::Store(StoreError::Unavailable(message))) if message == "down t1"
    ));
}

#[test]
fn panicking_expense_read_is_reported_with_its_trip() {
    let service = four_trip_service(vec!["t1"], ExpenseReadFault::Panic);

    let err = service.spending_patterns("u1").unwrap_err();
    assert!(matches!(err, AnalyticsError::WorkerPanicked(trip_id) if trip_id == "t1"));
}

#[test]
fn healthy_expense_reads_through_wrapper_store_succeed() {
    let service = four_trip_service(Vec::new(), ExpenseReadFault::Fail);

    let SpendingAnalysis::Summary(summary) = service.spending_patterns("u1").unwrap() else {
        panic!("expected a spending summary");
    };
    assert_eq!(summary.trip_count, 4);
    assert!(approx_eq(summary.total_spent, 40.0));
}
