#[cfg(test)]
mod tests {
    use crate::{
        Conditions, Expression, QueryBuilder, QueryError, QueryType, Result, TimeZone, args,
        named,
    };
    use pretty_assertions::assert_eq;
    use time::macros::datetime;

    #[test]
    fn select_defaults_to_star() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.select(())?.from("user")?;
        assert_eq!(qb.build()?, "SELECT * FROM `user`");
        Ok(())
    }

    #[test]
    fn select_fields_and_qualified_table() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.select(["id", "u.name", "COUNT(*) AS c"])?.from("db.user")?;
        assert_eq!(
            qb.build()?,
            "SELECT `id`, `u`.`name`, COUNT(*) AS c FROM `db`.`user`"
        );
        Ok(())
    }

    #[test]
    fn select_distinct() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.table("t")?.select_distinct("city")?;
        assert_eq!(qb.build()?, "SELECT DISTINCT `city` FROM `t`");
        assert_eq!(qb.statement_type(), Some(QueryType::SelectDistinct));
        Ok(())
    }

    #[test]
    fn fields_setter_is_write_once() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.fields(vec!["a", "b"])?.select(())?.from("t")?;
        assert_eq!(qb.build()?, "SELECT `a`, `b` FROM `t`");
        assert_eq!(qb.fields("c").err(), Some(QueryError::FieldsAlreadySet));
        Ok(())
    }

    #[test]
    fn where_and_chain_with_values() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.select("*")?
            .from("t")?
            .where_with("a = ?", args![1])?
            .and(Conditions::new().in_("b", ["x", "y"]))?
            .where_with("c > :c", named! {"c" => 5})?;
        assert_eq!(
            qb.build()?,
            "SELECT * FROM `t` WHERE a = 1 AND `b` IN ('x', 'y') AND c > 5"
        );
        Ok(())
    }

    #[test]
    fn vacuous_conditions_are_ignored_for_select() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.select("*")?.from("t")?.where_("  ")?.where_(Conditions::new())?;
        assert_eq!(qb.build()?, "SELECT * FROM `t`");
        Ok(())
    }

    #[test]
    fn empty_condition_before_type_is_an_error() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.from("t")?;
        assert_eq!(qb.where_("").err(), Some(QueryError::EmptyCondition));
        Ok(())
    }

    #[test]
    fn expression_condition() -> Result<()> {
        let mut e = Expression::new();
        e.and(Conditions::new().eq("a", 1))?.or("b IS NULL")?;
        let mut qb = QueryBuilder::new();
        qb.select("*")?.from("t")?.where_(e)?.where_("c = 2")?;
        assert_eq!(
            qb.build()?,
            "SELECT * FROM `t` WHERE (`a`=1 OR b IS NULL) AND c = 2"
        );
        Ok(())
    }

    #[test]
    fn or_where_groups_previous_conditions() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.select("*")?
            .from("t")?
            .where_(Conditions::new().eq("a", 1).eq("b", 2))?
            .or_where("c = 3")?
            .where_("d = 4")?;
        assert_eq!(
            qb.build()?,
            "SELECT * FROM `t` WHERE ((`a`=1 AND `b`=2) OR c = 3) AND d = 4"
        );

        let mut single = QueryBuilder::new();
        single.select("*")?.from("t")?.where_("a = 1")?.or_where("b = 2")?;
        assert_eq!(single.build()?, "SELECT * FROM `t` WHERE (a = 1 OR b = 2)");

        let mut first = QueryBuilder::new();
        first.select("*")?.from("t")?.or_where("b = 2")?;
        assert_eq!(first.build()?, "SELECT * FROM `t` WHERE b = 2");
        Ok(())
    }

    #[test]
    fn table_alias() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.select(["id"])?.from("user")?.as_("u")?;
        assert_eq!(qb.build()?, "SELECT `id` FROM `user` AS `u`");
        assert_eq!(
            qb.as_("v").err(),
            Some(QueryError::AliasAlreadySet("u".into()))
        );
        Ok(())
    }

    #[test]
    fn joins_prefix_every_field() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.select(["id", "*"])?.from("order")?.as_("o")?;
        qb.join("user", ["name"]).as_("u")?.on("o.uid=u.id")?;
        qb.right_join("shop", vec!["title", "s.city", "x AS y"])
            .on_with("shop.id = o.sid AND shop.state = ?", args![1])?;
        assert_eq!(
            qb.build()?,
            "SELECT `o`.`id`, `o`.*, `u`.`name`, `shop`.`title`, `s`.`city`, x AS y \
             FROM `order` AS `o` JOIN `user` AS `u` ON o.uid=u.id \
             RIGHT JOIN `shop` ON shop.id = o.sid AND shop.state = 1"
        );
        Ok(())
    }

    #[test]
    fn registered_alias_prefixes_later_joins() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.select("a")?.from("h")?;
        qb.join("w", ["x"]).as_("W")?.on("1=1")?;
        qb.join("w", ["y"]).on("2=2")?;
        assert_eq!(
            qb.build()?,
            "SELECT `h`.`a`, `W`.`x`, `W`.`y` FROM `h` JOIN `w` AS `W` ON 1=1 JOIN `w` ON 2=2"
        );
        assert_eq!(qb.alias_of("w"), Some("W"));
        assert_eq!(qb.table_of("W"), Some("w"));
        assert_eq!(qb.alias_of("h"), None);
        Ok(())
    }

    #[test]
    fn alias_before_table_is_registered() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.select("id")?.as_("u")?;
        assert_eq!(qb.table_of("u"), None);
        qb.from("user")?;
        assert_eq!(qb.table_of("u"), Some("user"));
        assert_eq!(qb.alias_of("user"), Some("u"));
        Ok(())
    }

    #[test]
    fn second_alias_after_join_goes_to_primary() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.select("a")?.from("h")?;
        qb.left_join("w", ["z"]).as_("B")?.as_("C")?;
        assert_eq!(
            qb.build()?,
            "SELECT `C`.`a`, `B`.`z` FROM `h` AS `C` LEFT JOIN `w` AS `B`"
        );
        assert_eq!(
            qb.as_("D").err(),
            Some(QueryError::AliasAlreadySet("C".into()))
        );
        Ok(())
    }

    #[test]
    fn join_without_fields_keeps_primary_star() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.select(())?.from("a")?.left_join("b", ()).on("a.id = b.aid")?;
        assert_eq!(qb.build()?, "SELECT `a`.* FROM `a` LEFT JOIN `b` ON a.id = b.aid");
        Ok(())
    }

    #[test]
    fn join_on_with_condition_map() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.select("id")?.from("a")?;
        qb.join("b", ()).on(Conditions::new().raw("a.id = b.aid").eq("b.kind", 2))?;
        assert_eq!(
            qb.build()?,
            "SELECT `a`.`id` FROM `a` JOIN `b` ON (a.id = b.aid AND `b`.`kind`=2)"
        );
        Ok(())
    }

    #[test]
    fn join_state_errors() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.select("*")?.from("a")?.as_("x")?;
        assert_eq!(qb.on("a = b").err(), Some(QueryError::JoinRequired));

        qb.join("b", ()).as_("y")?.on("x.id = y.id")?;
        assert_eq!(
            qb.on("x.k = y.k").err(),
            Some(QueryError::OnAlreadySet("b".into()))
        );

        qb.join("c", ());
        let err = qb.as_("x").unwrap_err();
        assert_eq!(err, QueryError::DuplicateAlias("x".into()));
        assert_eq!(err.to_string(), "alias is already registered: x");
        Ok(())
    }

    #[test]
    fn group_by_and_having() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.select(["city", "COUNT(*) AS n"])?
            .from("user")?
            .group_by("city")
            .having("COUNT(*) > ?")?;
        // 模板没有参数时原样保留
        assert_eq!(
            qb.build()?,
            "SELECT `city`, COUNT(*) AS n FROM `user` GROUP BY `city` HAVING COUNT(*) > ?"
        );

        let mut qb = QueryBuilder::new();
        qb.select("city")?
            .from("user")?
            .group_by(["city", "DATE(created)"])
            .having(crate::Template::new("COUNT(*) > ?", args![1]))?
            .having(Conditions::new().gt("total", 10))?;
        assert_eq!(
            qb.build()?,
            "SELECT `city` FROM `user` GROUP BY `city`, DATE(created) \
             HAVING COUNT(*) > 1 AND `total`>10"
        );
        Ok(())
    }

    #[test]
    fn having_requires_group_by() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.select("*")?.from("t")?;
        let err = qb.having("a > 1").unwrap_err();
        assert_eq!(err.to_string(), "having() requires group_by() first");
        Ok(())
    }

    #[test]
    fn ordering_and_limits() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.select("*")?.from("t")?;
        qb.order_by(["a", "b desc"]).order_by_asc("c").order_by_desc("t.d");
        qb.limit(10);
        assert_eq!(
            qb.build()?,
            "SELECT * FROM `t` ORDER BY `a`, `b` DESC, `c` ASC, `t`.`d` DESC LIMIT 10"
        );

        qb.offset(20);
        assert!(qb.build()?.ends_with("LIMIT 20,10"));

        qb.limit(0);
        assert!(qb.build()?.ends_with("LIMIT 20,18446744073709551615"));

        qb.offset(0);
        assert!(!qb.build()?.contains("LIMIT"));
        Ok(())
    }

    #[test]
    fn page_shortcut() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.select("*")?.from("t")?;
        qb.page(3, 20);
        assert_eq!(qb.build()?, "SELECT * FROM `t` LIMIT 40,20");
        qb.page(0, 5);
        assert_eq!(qb.build()?, "SELECT * FROM `t` LIMIT 5");
        Ok(())
    }

    #[test]
    fn table_and_type_are_write_once() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.select("*")?.from("t")?;

        let err = qb.into_table("u").unwrap_err();
        assert_eq!(err.to_string(), "table name is already set: t");
        let err = qb.delete().unwrap_err();
        assert_eq!(err.to_string(), "query type is already set: SELECT");
        assert_eq!(qb.table_name(), Some("t"));
        Ok(())
    }

    #[test]
    fn missing_table_or_type() -> Result<()> {
        let mut qb = QueryBuilder::new();
        assert_eq!(qb.build(), Err(QueryError::MissingType));
        qb.select("*")?;
        assert_eq!(qb.build(), Err(QueryError::MissingTable));
        assert_eq!(QueryError::MissingTable.to_string(), "table name is not set");
        Ok(())
    }

    #[test]
    fn time_zone_applies_to_later_conditions() -> Result<()> {
        let mut qb = QueryBuilder::new();
        assert_eq!(qb.set_time_zone(TimeZone::Utc), TimeZone::Local);
        assert_eq!(qb.time_zone(), TimeZone::Utc);
        qb.select("*")?
            .from("t")?
            .where_(Conditions::new().gte("at", datetime!(2023-06-07 08:09:10 UTC)))?;
        assert_eq!(
            qb.build()?,
            "SELECT * FROM `t` WHERE `at`>='2023-06-07 08:09:10.000'"
        );
        Ok(())
    }

    #[test]
    fn nested_subquery_in_template() -> Result<()> {
        let mut sub = QueryBuilder::new();
        sub.select("uid")?.from("vip")?.where_(Conditions::new().eq("level", 3))?;

        let mut qb = QueryBuilder::new();
        qb.select("*")?
            .from("user")?
            .where_with("id IN ? OR ref = ?", args![sub.clone(), &sub])?;
        assert_eq!(
            qb.build()?,
            "SELECT * FROM `user` WHERE id IN (SELECT `uid` FROM `vip` WHERE `level`=3) \
             OR ref = (SELECT `uid` FROM `vip` WHERE `level`=3)"
        );
        Ok(())
    }
}
