#[cfg(test)]
mod tests {
    use crate::{
        Conditions, QueryBuilder, QueryError, QueryType, Result, SqlValue, Updates, args, named,
        raw,
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn update_with_map_and_template() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.update()?
            .table("user")?
            .set(Updates::new().set("name", "bar").decr("credit", 5))?
            .set_with("updated_at = :now", named! {"now" => raw("NOW()")})?
            .where_(Conditions::new().eq("id", 7))?;
        assert_eq!(
            qb.build()?,
            "UPDATE `user` SET `name`='bar', `credit`=`credit`-(5), updated_at = NOW() \
             WHERE `id`=7"
        );
        Ok(())
    }

    #[test]
    fn update_with_order_and_limit() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.table("job")?.update()?.set("state = 1")?;
        qb.order_by_asc("id").limit(100);
        assert_eq!(
            qb.build()?,
            "UPDATE `job` SET state = 1 ORDER BY `id` ASC LIMIT 100"
        );
        Ok(())
    }

    #[test]
    fn update_requires_assignments() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.update()?.table("t")?.set(Updates::new())?;
        let err = qb.build().unwrap_err();
        assert_eq!(err.to_string(), "update cannot be empty");
        Ok(())
    }

    #[test]
    fn update_seeded_with_data() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.update_with(Updates::new().set("a", 1))?
            .table("t")?
            .set("b = b + 1")?
            .where_with("id = ?", args![3])?;
        assert_eq!(qb.build()?, "UPDATE `t` SET `a`=1, b = b + 1 WHERE id = 3");
        Ok(())
    }

    #[test]
    fn update_seeded_empty_then_set() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.update_with(Updates::new())?.table("t")?;
        assert_eq!(qb.build().err(), Some(QueryError::EmptyUpdate));

        qb.set(Updates::new().incr("n", 2))?;
        assert_eq!(qb.build()?, "UPDATE `t` SET `n`=`n`+(2)");

        let mut twice = QueryBuilder::new();
        twice.delete()?;
        assert_eq!(
            twice.update_with("a = 1").err(),
            Some(QueryError::TypeAlreadySet(QueryType::Delete))
        );
        Ok(())
    }

    #[test]
    fn set_requires_update() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.table("t")?;
        let err = qb.set("a = 1").unwrap_err();
        assert_eq!(
            err.to_string(),
            "set() requires update() or on_duplicate_key_update() first"
        );
        Ok(())
    }

    #[test]
    fn update_rejects_empty_condition() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.update()?.table("t")?.set("a = 1")?;
        assert_eq!(
            qb.where_(Conditions::new()).err(),
            Some(QueryError::EmptyCondition)
        );
        Ok(())
    }

    #[test]
    fn update_object_value_is_escaped_as_value() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.set_stringify_objects(true);
        qb.update()?
            .table("t")?
            .set(Updates::new().set("doc", SqlValue::object([("k", "v")])))?
            .where_with("id = ?", args![1])?;
        assert_eq!(qb.build()?, "UPDATE `t` SET `doc`='{k: v}' WHERE id = 1");
        Ok(())
    }

    #[test]
    fn delete_with_conditions() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.delete()?
            .from("session")?
            .where_(Conditions::new().lt("expires", 1000).ne("keep", true))?;
        qb.order_by("expires").limit(50);
        assert_eq!(
            qb.build()?,
            "DELETE FROM `session` WHERE `expires`<1000 AND `keep`<>true \
             ORDER BY `expires` LIMIT 50"
        );
        Ok(())
    }

    #[test]
    fn delete_without_conditions() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.table("t")?.delete()?;
        assert_eq!(qb.build()?, "DELETE FROM `t`");
        Ok(())
    }

    #[test]
    fn delete_rejects_blank_condition() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.table("t")?.delete()?;
        let err = qb.where_("   ").unwrap_err();
        assert_eq!(err.to_string(), "condition cannot be empty");
        Ok(())
    }

    #[test]
    fn delete_rejects_undefined_values() -> Result<()> {
        let mut qb = QueryBuilder::new();
        qb.table("t")?.delete()?;
        let err = qb
            .where_(Conditions::new().eq_opt("id", None::<i64>))
            .unwrap_err();
        assert_eq!(err, QueryError::UndefinedValues(vec!["id".into()]));
        Ok(())
    }
}
