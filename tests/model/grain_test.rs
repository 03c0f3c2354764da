#[cfg(test)]
mod tests {
    use granary::model::{ColumnType, DefinitionError, Grain, StructuralError};

    fn sample_grain() -> Grain {
        let mut grain = Grain::new("shop");
        let orders = grain.add_table("orders").unwrap();
        orders.add_column("id", ColumnType::Integer).unwrap();
        orders.add_column("customer", ColumnType::String).unwrap();
        orders.add_column("total", ColumnType::Float).unwrap();
        grain
    }

    #[test]
    fn test_names_are_unique_across_tables_and_views() {
        let mut grain = sample_grain();
        grain
            .create_view("totals", "select id, total from orders")
            .unwrap();

        assert!(matches!(
            grain.add_table("totals").unwrap_err(),
            DefinitionError::DuplicateName { .. }
        ));
        assert!(matches!(
            grain
                .create_view("orders", "select id from orders")
                .unwrap_err(),
            DefinitionError::DuplicateName { .. }
        ));
    }

    #[test]
    fn test_add_index() {
        let mut grain = sample_grain();
        grain
            .add_index("orders", "idx_customer", vec!["customer".into(), "id".into()])
            .unwrap();

        let index = grain.table("orders").unwrap().indices().get("idx_customer").unwrap();
        assert_eq!(index.columns(), ["customer".to_string(), "id".to_string()]);
    }

    #[test]
    fn test_index_names_unique_across_grain() {
        let mut grain = sample_grain();
        let items = grain.add_table("items").unwrap();
        items.add_column("sku", ColumnType::String).unwrap();

        grain
            .add_index("orders", "idx1", vec!["id".into()])
            .unwrap();
        let err = grain
            .add_index("items", "idx1", vec!["sku".into()])
            .unwrap_err();
        assert!(matches!(err, DefinitionError::DuplicateIndex { .. }));
    }

    #[test]
    fn test_index_rejects_bad_columns() {
        let mut grain = sample_grain();

        assert!(matches!(
            grain
                .add_index("orders", "idx_bad", vec!["missing".into()])
                .unwrap_err(),
            DefinitionError::BadIndexColumn { .. }
        ));
        assert!(matches!(
            grain
                .add_index("orders", "idx_dup", vec!["id".into(), "id".into()])
                .unwrap_err(),
            DefinitionError::BadIndexColumn { .. }
        ));
        assert!(matches!(
            grain
                .add_index("missing", "idx_nt", vec!["id".into()])
                .unwrap_err(),
            DefinitionError::UnknownRelation { .. }
        ));
    }

    #[test]
    fn test_remove_elements() {
        let mut grain = sample_grain();
        grain
            .create_view("totals", "select id, total from orders")
            .unwrap();

        let view = grain.remove_view("totals").unwrap();
        assert_eq!(view.name(), "totals");
        assert!(grain.view("totals").is_none());

        let table = grain.remove_table("orders").unwrap();
        assert_eq!(table.name(), "orders");
        assert!(grain.table("orders").is_none());

        assert!(matches!(
            grain.remove_table("orders").unwrap_err(),
            StructuralError::ElementNotFound { .. }
        ));
    }

    #[test]
    fn test_system_grain_refuses_removal() {
        let mut grain = Grain::new_system("core");
        let t = grain.add_table("settings").unwrap();
        t.add_column("key", ColumnType::String).unwrap();

        assert!(grain.is_system());
        assert!(matches!(
            grain.remove_table("settings").unwrap_err(),
            StructuralError::SystemGrain { .. }
        ));
    }

    #[test]
    fn test_failed_view_leaves_grain_untouched() {
        let mut grain = sample_grain();

        // Unknown column makes resolution fail after parsing succeeded.
        let err = grain
            .create_view("bad", "select missing from orders")
            .unwrap_err();
        assert!(matches!(err, DefinitionError::FieldNotFound { .. }));
        assert!(grain.views().is_empty());

        // The name stays free for a corrected definition.
        grain
            .create_view("bad", "select id from orders")
            .unwrap();
    }

    #[test]
    fn test_table_ref_snapshots_view_columns() {
        let mut grain = sample_grain();
        grain
            .create_view("totals", "select id, total from orders")
            .unwrap();

        let tref = grain.table_ref("totals", "t").unwrap();
        assert_eq!(tref.relation_name(), "totals");
        assert_eq!(tref.alias(), "t");
        assert_eq!(tref.columns().len(), 2);

        assert!(matches!(
            grain.table_ref("missing", "m").unwrap_err(),
            DefinitionError::UnknownRelation { .. }
        ));
    }
}
