#[cfg(test)]
mod tests {
    use granary::model::{ColumnType, DefinitionError, Grain, ViewColumnType};

    #[test]
    fn test_add_column_rejects_duplicates() {
        let mut grain = Grain::new("g");
        let table = grain.add_table("t").unwrap();

        table.add_column("a", ColumnType::Integer).unwrap();
        let err = table.add_column("a", ColumnType::String).unwrap_err();
        assert!(matches!(err, DefinitionError::DuplicateColumn { .. }));
    }

    #[test]
    fn test_integer_default_value() {
        let mut grain = Grain::new("g");
        let table = grain.add_table("t").unwrap();
        table.add_column("a", ColumnType::Integer).unwrap();

        table.set_column_default("a", Some("5")).unwrap();
        let column = table.column("a").unwrap();
        assert_eq!(column.default_lexical().as_deref(), Some("5"));
        assert!(!column.is_identity());
    }

    #[test]
    fn test_integer_identity_case_insensitive() {
        let mut grain = Grain::new("g");
        let table = grain.add_table("t").unwrap();
        table.add_column("a", ColumnType::Integer).unwrap();

        table.set_column_default("a", Some("identity")).unwrap();
        let column = table.column("a").unwrap();
        assert!(column.is_identity());
        assert_eq!(column.default_lexical().as_deref(), Some("IDENTITY"));
    }

    #[test]
    fn test_one_identity_column_per_table() {
        let mut grain = Grain::new("g");
        let table = grain.add_table("t").unwrap();
        table.add_column("a", ColumnType::Integer).unwrap();
        table.add_column("b", ColumnType::Integer).unwrap();

        table.set_column_default("a", Some("IDENTITY")).unwrap();
        let err = table.set_column_default("b", Some("IDENTITY")).unwrap_err();
        assert!(matches!(err, DefinitionError::MultipleIdentity { .. }));

        // Re-assigning the same column is not a second identity.
        table.set_column_default("a", Some("IDENTITY")).unwrap();
    }

    #[test]
    fn test_clearing_identity_frees_the_slot() {
        let mut grain = Grain::new("g");
        let table = grain.add_table("t").unwrap();
        table.add_column("a", ColumnType::Integer).unwrap();
        table.add_column("b", ColumnType::Integer).unwrap();

        table.set_column_default("a", Some("IDENTITY")).unwrap();
        table.set_column_default("a", None).unwrap();
        table.set_column_default("b", Some("IDENTITY")).unwrap();
        assert!(!table.column("a").unwrap().is_identity());
        assert!(table.column("b").unwrap().is_identity());
    }

    #[test]
    fn test_bad_defaults_are_rejected() {
        let mut grain = Grain::new("g");
        let table = grain.add_table("t").unwrap();
        table.add_column("n", ColumnType::Integer).unwrap();
        table.add_column("f", ColumnType::Float).unwrap();
        table.add_column("b", ColumnType::Boolean).unwrap();

        assert!(matches!(
            table.set_column_default("n", Some("abc")).unwrap_err(),
            DefinitionError::BadDefault { .. }
        ));
        assert!(matches!(
            table.set_column_default("f", Some("1.2.3")).unwrap_err(),
            DefinitionError::BadDefault { .. }
        ));
        assert!(matches!(
            table.set_column_default("b", Some("yes")).unwrap_err(),
            DefinitionError::BadDefault { .. }
        ));
    }

    #[test]
    fn test_boolean_default_parses() {
        let mut grain = Grain::new("g");
        let table = grain.add_table("t").unwrap();
        table.add_column("b", ColumnType::Boolean).unwrap();

        table.set_column_default("b", Some("TRUE")).unwrap();
        assert_eq!(
            table.column("b").unwrap().default_lexical().as_deref(),
            Some("true")
        );
    }

    #[test]
    fn test_datetime_getdate_marker() {
        let mut grain = Grain::new("g");
        let table = grain.add_table("t").unwrap();
        table.add_column("d", ColumnType::DateTime).unwrap();

        table.set_column_default("d", Some("GETDATE")).unwrap();
        assert_eq!(
            table.column("d").unwrap().default_lexical().as_deref(),
            Some("GETDATE")
        );

        // A concrete literal replaces the marker and is kept verbatim.
        table.set_column_default("d", Some("'2026-01-01'")).unwrap();
        assert_eq!(
            table.column("d").unwrap().default_lexical().as_deref(),
            Some("'2026-01-01'")
        );
    }

    #[test]
    fn test_unknown_column_default() {
        let mut grain = Grain::new("g");
        let table = grain.add_table("t").unwrap();

        let err = table.set_column_default("nope", Some("1")).unwrap_err();
        assert!(matches!(err, DefinitionError::UnknownColumn { .. }));
    }

    #[test]
    fn test_default_defaults_and_accessors() {
        let mut grain = Grain::new("g");
        let table = grain.add_table("t").unwrap();
        table.add_column("n", ColumnType::Integer).unwrap();
        table.add_column("f", ColumnType::Float).unwrap();
        table.add_column("s", ColumnType::String).unwrap();
        table.add_column("b", ColumnType::Boolean).unwrap();
        table.add_column("d", ColumnType::DateTime).unwrap();
        table.add_column("raw", ColumnType::Binary).unwrap();

        assert_eq!(table.column("n").unwrap().default_default(), "0");
        assert_eq!(table.column("f").unwrap().default_default(), "0.0");
        assert_eq!(table.column("s").unwrap().default_default(), "''");
        assert_eq!(table.column("b").unwrap().default_default(), "false");
        assert_eq!(table.column("d").unwrap().default_default(), "getdate()");
        assert_eq!(table.column("raw").unwrap().default_default(), "null");

        assert_eq!(table.column("n").unwrap().accessor(), "get_int");
        assert_eq!(table.column("s").unwrap().accessor(), "get_string");
        assert_eq!(table.column("raw").unwrap().accessor(), "get_blob");
    }

    #[test]
    fn test_column_metas_follow_declaration_order() {
        let mut grain = Grain::new("g");
        let table = grain.add_table("t").unwrap();
        table.add_column("n", ColumnType::Integer).unwrap();
        table.add_column("s", ColumnType::String).unwrap();
        table.add_column("d", ColumnType::DateTime).unwrap();

        let metas = table.column_metas();
        let entries: Vec<(&str, ViewColumnType)> =
            metas.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(
            entries,
            vec![
                ("n", ViewColumnType::Int),
                ("s", ViewColumnType::Text),
                ("d", ViewColumnType::Date),
            ]
        );
    }
}
