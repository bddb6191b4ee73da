use proptest::prelude::*;
use proptest::test_runner::Config;

use shopit::{Error, ListQuery, StockFields, StockGateway, StockType, ValidationError};

const COLLECTION: &str = "stockapp/stock";

fn gateway_with_one() -> (StockGateway, String) {
    let gateway = StockGateway::open_in_memory().expect("in-memory gateway");
    let fields = StockFields::new()
        .name("Eyeliner")
        .supplier("Loreal")
        .stock_type(StockType::TypeTwo)
        .price(5)
        .quantity(10);
    let uri = gateway.create(COLLECTION, &fields).expect("seed record").to_string();
    (gateway, uri)
}

fn any_stock_type() -> impl Strategy<Value = StockType> {
    prop_oneof![
        Just(StockType::Unknown),
        Just(StockType::TypeOne),
        Just(StockType::TypeTwo),
    ]
}

fn invalid_type_code() -> impl Strategy<Value = i64> {
    prop_oneof![i64::MIN..0_i64, 3_i64..=i64::MAX]
}

proptest! {
    #![proptest_config(Config::with_cases(64))]

    #[test]
    fn create_then_read_returns_same_fields(
        name in "[A-Za-z][A-Za-z0-9 ]{0,24}",
        supplier in "[A-Za-z ]{0,16}",
        stock_type in any_stock_type(),
        quantity in 0_i64..1_000_000,
        price in 0_i64..100_000,
    ) {
        let gateway = StockGateway::open_in_memory().expect("in-memory gateway");
        let fields = StockFields::new()
            .name(name.clone())
            .supplier(supplier.clone())
            .stock_type(stock_type)
            .quantity(quantity)
            .price(price);

        let uri = gateway.create(COLLECTION, &fields).expect("valid create");
        let rows = gateway.list(&uri.to_string(), &ListQuery::all()).expect("read back");
        prop_assert_eq!(rows.len(), 1);

        let record = rows.records().pop().expect("full record");
        prop_assert_eq!(record.name, name);
        prop_assert_eq!(record.supplier, Some(supplier));
        prop_assert_eq!(record.stock_type, stock_type);
        prop_assert_eq!(record.quantity, quantity);
        prop_assert_eq!(record.price, price);
        prop_assert_eq!(record.image, None);
    }

    #[test]
    fn missing_name_leaves_count_unchanged(
        blank in proptest::option::of("[ \t]{0,6}"),
        code in any::<i64>(),
        quantity in any::<i64>(),
    ) {
        let (gateway, _) = gateway_with_one();
        let mut fields = StockFields::new().type_code(code).quantity(quantity);
        if let Some(blank) = blank {
            fields = fields.name(blank);
        }

        let result = gateway.create(COLLECTION, &fields);
        prop_assert!(matches!(result, Err(Error::Validation(ValidationError::MissingName))));
        prop_assert_eq!(gateway.stats().expect("stats").records, 1);
    }

    #[test]
    fn type_outside_known_codes_is_rejected(code in invalid_type_code()) {
        let (gateway, uri) = gateway_with_one();

        let create = gateway.create(COLLECTION, &StockFields::new().name("Blush").type_code(code));
        prop_assert!(matches!(create, Err(Error::Validation(ValidationError::InvalidType))));

        let update = gateway.update(&uri, &StockFields::new().type_code(code), None);
        prop_assert!(matches!(update, Err(Error::Validation(ValidationError::InvalidType))));

        let record = gateway.list(&uri, &ListQuery::all()).expect("read back").records().pop().expect("record");
        prop_assert_eq!(record.stock_type, StockType::TypeTwo);
        prop_assert_eq!(gateway.stats().expect("stats").records, 1);
    }

    #[test]
    fn negative_quantity_or_price_changes_nothing(
        negative in i64::MIN..0_i64,
        on_price in any::<bool>(),
    ) {
        let (gateway, uri) = gateway_with_one();
        let before = gateway.list(COLLECTION, &ListQuery::all()).expect("snapshot");

        let (fields, expected) = if on_price {
            (StockFields::new().price(negative), ValidationError::InvalidPrice)
        } else {
            (StockFields::new().quantity(negative), ValidationError::NegativeQuantity)
        };
        let create_fields = {
            let base = StockFields::new().name("Blush").stock_type(StockType::TypeOne);
            if on_price { base.price(negative) } else { base.quantity(negative) }
        };

        let create = gateway.create(COLLECTION, &create_fields);
        prop_assert!(matches!(create, Err(Error::Validation(reason)) if reason == expected));

        let item = gateway.update(&uri, &fields, None);
        prop_assert!(matches!(item, Err(Error::Validation(reason)) if reason == expected));

        let collection = gateway.update(COLLECTION, &fields, None);
        prop_assert!(matches!(collection, Err(Error::Validation(reason)) if reason == expected));

        let after = gateway.list(COLLECTION, &ListQuery::all()).expect("snapshot");
        prop_assert_eq!(before, after);
    }
}
