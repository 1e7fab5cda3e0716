//! Relation queries on cloned sessions.

use crate::error::CoreResult;
use crate::proxy::DataProxy;
use foodwaste_sql::Statement;
use foodwaste_store::{DataAccessor, DataReader, RowReader};

/// Runs `statement` on a fresh clone of `accessor`.
///
/// The clone is released before the rows are returned.
///
/// # Errors
///
/// Returns an error if the clone cannot be opened or the query fails.
pub fn query_rows(accessor: &dyn DataAccessor, statement: &Statement) -> CoreResult<RowReader> {
    let mut session = accessor.clone_accessor()?;
    Ok(session.query(statement)?)
}

/// Loads every row of `statement` as a proxy with its scalars mapped.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be mapped.
pub fn load_all<P: DataProxy>(accessor: &dyn DataAccessor, statement: &Statement) -> CoreResult<Vec<P>> {
    let mut reader = query_rows(accessor, statement)?;
    let mut proxies = Vec::with_capacity(reader.len());
    while reader.read() {
        let mut proxy = P::default();
        proxy.map_data(&reader, accessor)?;
        proxies.push(proxy);
    }
    Ok(proxies)
}

/// Loads the first row of `statement`, if any.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be mapped.
pub fn load_one<P: DataProxy>(accessor: &dyn DataAccessor, statement: &Statement) -> CoreResult<Option<P>> {
    Ok(load_all(accessor, statement)?.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder;
    use crate::proxy::FoodItemProxy;
    use crate::schema::{create_memory_tables, FOOD_ITEMS};
    use crate::state::HydrationState;
    use foodwaste_sql::SqlValue;
    use foodwaste_store::MemoryAccessor;

    #[test]
    fn every_load_uses_its_own_session() {
        let mut store = MemoryAccessor::new();
        create_memory_tables(&store);
        store
            .execute(&builder::insert(
                &FOOD_ITEMS,
                vec![
                    SqlValue::text("11111111-1111-1111-1111-111111111111"),
                    SqlValue::Bool(true),
                ],
            ))
            .unwrap();

        let items: Vec<FoodItemProxy> =
            load_all(&store, &Statement::from(builder::select_all(&FOOD_ITEMS))).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].state(), HydrationState::ScalarsLoaded);
        assert_eq!(store.clone_count(), 1);
        let journal = store.journal();
        assert_ne!(journal.last().unwrap().session, store.session_id());
    }
}
