use diesel::prelude::*;

use crate::{
    domain::message::{Message as DomainMessage, MessageListQuery, NewMessage as DomainNewMessage},
    models::message::{Message as DbMessage, NewMessage as DbNewMessage},
    repository::{DieselRepository, MessageReader, MessageWriter, errors::RepositoryResult},
};

impl MessageReader for DieselRepository {
    fn list_messages(
        &self,
        query: MessageListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainMessage>)> {
        use crate::schema::messages;

        let mut conn = self.conn()?;

        let mut count_query = messages::table
            .filter(messages::receiver_id.eq(query.receiver_id))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if query.unread_only {
            count_query = count_query.filter(messages::is_read.eq(false));
        }

        let total = count_query.count().get_result::<i64>(&mut conn)? as usize;

        let mut items = messages::table
            .filter(messages::receiver_id.eq(query.receiver_id))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if query.unread_only {
            items = items.filter(messages::is_read.eq(false));
        }

        items = items
            .order(messages::created_at.desc())
            .then_order_by(messages::id.desc());

        if let Some(pagination) = &query.pagination {
            items = items.offset(pagination.offset()).limit(pagination.limit());
        }

        let messages = items.load::<DbMessage>(&mut conn)?;

        Ok((total, messages.into_iter().map(Into::into).collect()))
    }

    fn count_unread(&self, receiver_id: i32) -> RepositoryResult<usize> {
        use crate::schema::messages;

        let mut conn = self.conn()?;
        let count = messages::table
            .filter(messages::receiver_id.eq(receiver_id))
            .filter(messages::is_read.eq(false))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count as usize)
    }
}

impl MessageWriter for DieselRepository {
    fn create_message(&self, new_message: &DomainNewMessage) -> RepositoryResult<DomainMessage> {
        use crate::schema::messages;

        let mut conn = self.conn()?;
        let created = diesel::insert_into(messages::table)
            .values(&DbNewMessage::from(new_message))
            .get_result::<DbMessage>(&mut conn)?;

        Ok(created.into())
    }

    fn mark_message_read(
        &self,
        message_id: i32,
        receiver_id: i32,
    ) -> RepositoryResult<DomainMessage> {
        use crate::schema::messages;

        let mut conn = self.conn()?;
        let target = messages::table
            .filter(messages::id.eq(message_id))
            .filter(messages::receiver_id.eq(receiver_id));

        let updated = diesel::update(target)
            .set(messages::is_read.eq(true))
            .get_result::<DbMessage>(&mut conn)?;

        Ok(updated.into())
    }
}
