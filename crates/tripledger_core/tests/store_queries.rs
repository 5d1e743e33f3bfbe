use serde_json::json;
use tripledger_core::{
    DocumentQuery, DocumentStore, FilterOp, MemoryDocumentStore, SortDirection,
    SqliteDocumentStore, StoreError,
};

fn seed(insert: impl Fn(&str, serde_json::Value)) {
    insert("a", json!({"viagemId": "t1", "valor": 10.0, "ordem": 3}));
    insert("b", json!({"viagemId": "t1", "valor": 25.5, "ordem": 1}));
    insert("c", json!({"viagemId": "t1", "valor": "25.5"}));
    insert("d", json!({"viagemId": "t2", "valor": 40.0, "ordem": 2}));
    insert("e", json!({"viagemId": "t1", "valor": 25.5, "ordem": 1}));
}

fn stores() -> Vec<(&'static str, Box<dyn DocumentStore>)> {
    let memory = MemoryDocumentStore::new();
    seed(|key, body| {
        memory.insert("despesas", Some(key), &body).unwrap();
    });
    let sqlite = SqliteDocumentStore::open_in_memory().unwrap();
    seed(|key, body| {
        sqlite.insert("despesas", Some(key), &body).unwrap();
    });
    let memory: Box<dyn DocumentStore> = Box::new(memory);
    let sqlite: Box<dyn DocumentStore> = Box::new(sqlite);
    vec![("memory", memory), ("sqlite", sqlite)]
}

fn keys(store: &dyn DocumentStore, query: &DocumentQuery) -> Vec<String> {
    store
        .query("despesas", query)
        .unwrap()
        .into_iter()
        .map(|document| document.key)
        .collect()
}

#[test]
fn equality_filter_does_not_match_across_value_kinds() {
    for (name, store) in stores() {
        let query = DocumentQuery::new()
            .where_eq("valor", 25.5)
            .order_by("valor", SortDirection::Ascending);
        assert_eq!(keys(store.as_ref(), &query), vec!["b", "e"], "{name}");
    }
}

#[test]
fn range_filters_combine_with_and() {
    for (name, store) in stores() {
        let query = DocumentQuery::new()
            .where_eq("viagemId", "t1")
            .filter("valor", FilterOp::Gt, 10.0)
            .filter("valor", FilterOp::Lte, 30.0)
            .order_by("valor", SortDirection::Ascending);
        assert_eq!(keys(store.as_ref(), &query), vec!["b", "e"], "{name}");
    }
}

#[test]
fn missing_order_field_sorts_first_ascending_and_last_descending() {
    for (name, store) in stores() {
        let ascending = DocumentQuery::new()
            .where_eq("viagemId", "t1")
            .order_by("ordem", SortDirection::Ascending);
        assert_eq!(
            keys(store.as_ref(), &ascending),
            vec!["c", "b", "e", "a"],
            "{name}"
        );

        let descending = DocumentQuery::new()
            .where_eq("viagemId", "t1")
            .order_by("ordem", SortDirection::Descending);
        assert_eq!(
            keys(store.as_ref(), &descending),
            vec!["a", "b", "e", "c"],
            "{name}"
        );
    }
}

#[test]
fn get_returns_none_for_unknown_key() {
    for (name, store) in stores() {
        assert!(store.get("despesas", "zzz").unwrap().is_none(), "{name}");
        assert!(store.get("viagens", "a").unwrap().is_none(), "{name}");
        let found = store.get("despesas", "d").unwrap().unwrap();
        assert_eq!(found.field("valor"), Some(&json!(40.0)), "{name}");
    }
}

#[test]
fn invalid_field_names_are_rejected_before_querying() {
    for (name, store) in stores() {
        let query = DocumentQuery::new().where_eq("valor') OR 1=1 --", 1);
        let err = store.query("despesas", &query).unwrap_err();
        assert!(matches!(err, StoreError::InvalidField(_)), "{name}");
    }
}
