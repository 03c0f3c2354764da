#[cfg(test)]
mod tests {
    use granary::model::{ColumnType, Grain};
    use granary::sql::dialect::{Canonical, Postgres, TSql};

    fn sample_grain() -> Grain {
        let mut grain = Grain::new("shop");
        let orders = grain.add_table("orders").unwrap();
        orders.add_column("id", ColumnType::Integer).unwrap();
        orders.add_column("customer", ColumnType::String).unwrap();
        orders.add_column("total", ColumnType::Float).unwrap();
        let items = grain.add_table("items").unwrap();
        items.add_column("item_id", ColumnType::Integer).unwrap();
        items.add_column("order_id", ColumnType::Integer).unwrap();
        items.add_column("price", ColumnType::Float).unwrap();
        grain
    }

    #[test]
    fn test_canonical_definition() {
        let mut grain = sample_grain();
        let view = grain
            .create_view(
                "v1",
                "select id, customer from orders as o where total > 100",
            )
            .unwrap();

        assert_eq!(
            view.definition(),
            "  select id as id, customer as customer\n\
             \x20 from orders as o\n\
             \x20 where total > 100"
        );
    }

    #[test]
    fn test_canonical_create_view_script() {
        let mut grain = sample_grain();
        let view = grain
            .create_view("v1", "select id from orders")
            .unwrap();

        assert_eq!(
            view.create_view_script(&Canonical),
            "create view v1 as\n\
             \x20 select id as id\n\
             \x20 from orders"
        );
    }

    #[test]
    fn test_save_script_terminates_statement() {
        let mut grain = sample_grain();
        let view = grain
            .create_view("v1", "select id from orders")
            .unwrap();

        let script = view.save_script();
        assert!(script.ends_with(";\n\n"));
        assert!(script.starts_with("create view v1 as\n"));
    }

    #[test]
    fn test_join_and_group_by_rendering() {
        let mut grain = sample_grain();
        let view = grain
            .create_view(
                "spending",
                "select o.customer as customer, sum(i.price) as spent \
                 from orders as o inner join items as i on o.id = i.order_id \
                 group by customer",
            )
            .unwrap();

        assert_eq!(
            view.definition(),
            "  select o.customer as customer, sum(i.price) as spent\n\
             \x20 from orders as o\n\
             \x20   inner join items as i on o.id = i.order_id\n\
             \x20group by customer"
        );
    }

    #[test]
    fn test_postgres_script() {
        let mut grain = sample_grain();
        let view = grain
            .create_view("v1", "select id, customer from orders as o")
            .unwrap();

        assert_eq!(
            view.create_view_script(&Postgres),
            "create or replace view \"shop\".\"v1\" as\n\
             \x20 select id as \"id\", customer as \"customer\"\n\
             \x20 from \"shop\".\"orders\" as \"o\""
        );
    }

    #[test]
    fn test_tsql_script() {
        let mut grain = sample_grain();
        let view = grain
            .create_view("v1", "select id from orders as o")
            .unwrap();

        assert_eq!(
            view.create_view_script(&TSql),
            "create view [shop].[v1] as\n\
             \x20 select id as [id]\n\
             \x20 from [shop].[orders] as [o]"
        );
    }

    #[test]
    fn test_select_list_wraps_long_lines() {
        let mut grain = Grain::new("g");
        let wide = grain.add_table("wide").unwrap();
        for i in 1..=12 {
            wide.add_column(format!("c{}", i), ColumnType::Integer)
                .unwrap();
        }

        let sql: String = (1..=12)
            .map(|i| format!("c{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let view = grain
            .create_view("v", &format!("select {} from wide", sql))
            .unwrap();

        let definition = view.definition();
        let lines: Vec<&str> = definition.lines().collect();
        assert!(lines.len() > 2, "select list should have wrapped");
        // Continuation lines carry the four-space padding; FROM keeps its
        // own two-space indent.
        assert!(lines[1].starts_with("    "));
        assert_eq!(lines.last().unwrap(), &"  from wide");
        // Wrapping applies to the select list only.
        assert!(lines[0].len() >= 80);
    }

    #[test]
    fn test_real_literals_keep_decimal_point() {
        let mut grain = sample_grain();
        let view = grain
            .create_view("v1", "select id from orders where total > 100.0")
            .unwrap();

        assert!(view.definition().contains("total > 100.0"));
    }

    #[test]
    fn test_string_literals_escape_quotes() {
        let mut grain = sample_grain();
        let view = grain
            .create_view("v1", "select id from orders where customer = 'O''Brien'")
            .unwrap();

        assert!(view.definition().contains("customer = 'O''Brien'"));
    }

    #[test]
    fn test_definition_round_trips() {
        let mut grain = sample_grain();
        let sources = [
            "select id, customer from orders as o where total > 100",
            "select o.customer as customer, sum(i.price) as spent \
             from orders as o inner join items as i on o.id = i.order_id \
             group by customer",
            "select distinct customer from orders",
            "select count(*) as n from orders where not (total < 5.5 or total > 10.5)",
        ];

        for (i, source) in sources.iter().enumerate() {
            let name = format!("v{}", i);
            let definition = grain.create_view(&name, source).unwrap().definition().to_string();

            let copy_name = format!("copy{}", i);
            let copy = grain.create_view(&copy_name, &definition).unwrap();
            assert_eq!(copy.definition(), definition, "source: {}", source);
        }
    }
}
