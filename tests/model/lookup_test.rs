#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use granary::model::{
        ColumnType, DefinitionError, FieldsLookup, Grain, LookupError, Relation, StructuralError,
    };

    /// Three tables with the same shape: two integers, a string and a
    /// datetime, with a composite index over the first three columns. The
    /// matching views select every column.
    fn sample_grain() -> Grain {
        let mut grain = Grain::new("g");
        for prefix in ["a", "b", "c"] {
            let table = grain.add_table(prefix).unwrap();
            table
                .add_column(format!("{}1", prefix), ColumnType::Integer)
                .unwrap();
            table
                .add_column(format!("{}2", prefix), ColumnType::Integer)
                .unwrap();
            table
                .add_column(format!("{}3", prefix), ColumnType::String)
                .unwrap();
            table
                .add_column(format!("{}4", prefix), ColumnType::DateTime)
                .unwrap();
            grain
                .add_index(
                    prefix,
                    format!("idx_{}", prefix),
                    vec![
                        format!("{}1", prefix),
                        format!("{}2", prefix),
                        format!("{}3", prefix),
                    ],
                )
                .unwrap();
        }
        for prefix in ["a", "b", "c"] {
            grain
                .create_view(
                    &format!("{}_v", prefix),
                    &format!(
                        "select {p}1, {p}2, {p}3, {p}4 from {p}",
                        p = prefix
                    ),
                )
                .unwrap();
        }
        grain
    }

    fn no_op_lookup<'s>(
        left: Relation<'s>,
        right: Relation<'s>,
    ) -> Result<FieldsLookup<'s>, StructuralError> {
        FieldsLookup::new(left, right, Rc::new(|| {}), Rc::new(|_| {}))
    }

    #[test]
    fn test_pairing_in_index_order() {
        let grain = sample_grain();
        let a = Relation::Table(grain.table("a").unwrap());
        let b = Relation::Table(grain.table("b").unwrap());

        let mut lookup = no_op_lookup(a, b).unwrap();
        lookup.add("a1", "b1").unwrap();
        lookup.add("a2", "b2").unwrap();
        lookup.add("a3", "b3").unwrap();

        let (left, right) = lookup.fields();
        assert_eq!(left, ["a1".to_string(), "a2".to_string(), "a3".to_string()]);
        assert_eq!(right, ["b1".to_string(), "b2".to_string(), "b3".to_string()]);
    }

    #[test]
    fn test_out_of_order_pairing_fails() {
        let grain = sample_grain();
        let a = Relation::Table(grain.table("a").unwrap());
        let b = Relation::Table(grain.table("b").unwrap());

        let mut lookup = no_op_lookup(a, b).unwrap();
        let err = lookup.add("a2", "b2").unwrap_err();
        assert!(matches!(
            err,
            LookupError::Structural(StructuralError::IndexMismatch { .. })
        ));
    }

    #[test]
    fn test_unindexed_column_fails() {
        let grain = sample_grain();
        let a = Relation::Table(grain.table("a").unwrap());
        let b = Relation::Table(grain.table("b").unwrap());

        // a4 exists but belongs to no index.
        let mut lookup = no_op_lookup(a, b).unwrap();
        let err = lookup.add("a4", "b4").unwrap_err();
        assert!(matches!(
            err,
            LookupError::Structural(StructuralError::IndexMismatch { .. })
        ));
    }

    #[test]
    fn test_one_sided_index_failure() {
        let grain = sample_grain();
        let a = Relation::Table(grain.table("a").unwrap());
        let b = Relation::Table(grain.table("b").unwrap());

        // Left side follows its index, right side does not.
        let mut lookup = no_op_lookup(a, b).unwrap();
        let err = lookup.add("a1", "b2").unwrap_err();
        assert!(matches!(
            err,
            LookupError::Structural(StructuralError::IndexMismatch { .. })
        ));
    }

    #[test]
    fn test_failed_add_commits_nothing() {
        let grain = sample_grain();
        let a = Relation::Table(grain.table("a").unwrap());
        let b = Relation::Table(grain.table("b").unwrap());

        let mut lookup = no_op_lookup(a, b).unwrap();
        lookup.add("a1", "b1").unwrap();
        lookup.add("a2", "b4").unwrap_err();

        let (left, right) = lookup.fields();
        assert_eq!(left, ["a1".to_string()]);
        assert_eq!(right, ["b1".to_string()]);

        // The lookup stays usable after the failure.
        lookup.add("a2", "b2").unwrap();
    }

    #[test]
    fn test_unknown_field_is_a_definition_error() {
        let grain = sample_grain();
        let a = Relation::Table(grain.table("a").unwrap());
        let b = Relation::Table(grain.table("b").unwrap());

        let mut lookup = no_op_lookup(a, b).unwrap();
        let err = lookup.add("nope", "b1").unwrap_err();
        assert!(matches!(
            err,
            LookupError::Definition(DefinitionError::LookupFieldNotFound { .. })
        ));
    }

    #[test]
    fn test_relation_kinds_must_match() {
        let grain = sample_grain();
        let a = Relation::Table(grain.table("a").unwrap());
        let b_v = Relation::View(grain.view("b_v").unwrap());

        let err = no_op_lookup(a, b_v).unwrap_err();
        assert!(matches!(err, StructuralError::RelationKindMismatch { .. }));
    }

    #[test]
    fn test_views_pair_without_index_constraints() {
        let grain = sample_grain();
        let a_v = Relation::View(grain.view("a_v").unwrap());
        let b_v = Relation::View(grain.view("b_v").unwrap());

        let mut lookup = no_op_lookup(a_v, b_v).unwrap();
        // Any order, any column, including the unindexed datetime.
        lookup.add("a4", "b4").unwrap();
        lookup.add("a2", "b1").unwrap();

        let (left, _) = lookup.fields();
        assert_eq!(left.len(), 2);
    }

    #[test]
    fn test_chaining_builds_independent_lookup() {
        let grain = sample_grain();
        let a = Relation::Table(grain.table("a").unwrap());
        let b = Relation::Table(grain.table("b").unwrap());
        let c = Relation::Table(grain.table("c").unwrap());

        let mut first = no_op_lookup(a, b).unwrap();
        first.add("a1", "b1").unwrap();

        let mut second = first.and(c).unwrap();
        assert_eq!(second.left().name(), "b");
        assert_eq!(second.right().name(), "c");
        // The chained lookup starts empty and validates on its own.
        assert!(second.fields().0.is_empty());
        second.add("b1", "c1").unwrap();

        let (left, _) = first.fields();
        assert_eq!(left, ["a1".to_string()]);
    }

    #[test]
    fn test_chained_lookup_needs_its_own_indices() {
        let mut grain = sample_grain();
        let bare = grain.add_table("bare").unwrap();
        bare.add_column("b1", ColumnType::Integer).unwrap();

        let a = Relation::Table(grain.table("a").unwrap());
        let b = Relation::Table(grain.table("b").unwrap());
        let d = Relation::Table(grain.table("bare").unwrap());

        let mut first = no_op_lookup(a, b).unwrap();
        first.add("a1", "b1").unwrap();

        // The base pair stays valid, but the chained relation has no index
        // to cover the pairing.
        let mut second = first.and(d).unwrap();
        let err = second.add("b1", "b1").unwrap_err();
        assert!(matches!(
            err,
            LookupError::Structural(StructuralError::IndexMismatch { .. })
        ));
        assert_eq!(first.fields().0, ["a1".to_string()]);
    }

    #[test]
    fn test_chaining_rejects_kind_switch() {
        let grain = sample_grain();
        let a = Relation::Table(grain.table("a").unwrap());
        let b = Relation::Table(grain.table("b").unwrap());
        let c_v = Relation::View(grain.view("c_v").unwrap());

        let first = no_op_lookup(a, b).unwrap();
        let err = first.and(c_v).unwrap_err();
        assert!(matches!(err, StructuralError::RelationKindMismatch { .. }));
    }

    #[test]
    fn test_callbacks_fire() {
        let grain = sample_grain();
        let a = Relation::Table(grain.table("a").unwrap());
        let b = Relation::Table(grain.table("b").unwrap());
        let c = Relation::Table(grain.table("c").unwrap());

        let changes = Rc::new(Cell::new(0u32));
        let chains = Rc::new(Cell::new(0u32));
        let changes_cb = Rc::clone(&changes);
        let chains_cb = Rc::clone(&chains);

        let mut lookup = FieldsLookup::new(
            a,
            b,
            Rc::new(move || changes_cb.set(changes_cb.get() + 1)),
            Rc::new(move |_| chains_cb.set(chains_cb.get() + 1)),
        )
        .unwrap();

        lookup.add("a1", "b1").unwrap();
        lookup.add("a2", "b2").unwrap();
        // A failed add does not count as a change.
        lookup.add("a4", "b4").unwrap_err();
        assert_eq!(changes.get(), 2);

        let mut chained = lookup.and(c).unwrap();
        assert_eq!(chains.get(), 1);

        // Callbacks travel with the chain.
        chained.add("b1", "c1").unwrap();
        assert_eq!(changes.get(), 3);
    }
}
