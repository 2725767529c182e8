use mongodb::{
    bson::doc,
    options::IndexOptions,
    Database, IndexModel,
};

use super::repository::{TOKEN_ALERTS, USERS};

pub async fn ensure_indexes(db: &Database) -> Result<(), String> {
    // users: unique googleId, the subscriber identifier
    {
        let col = db.collection::<mongodb::bson::Document>(USERS);
        let model = IndexModel::builder()
            .keys(doc! { "googleId": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        col.create_index(model, None)
            .await
            .map_err(|e| e.to_string())?;
    }

    // tokenalerts: one registry per token
    {
        let col = db.collection::<mongodb::bson::Document>(TOKEN_ALERTS);
        let model = IndexModel::builder()
            .keys(doc! { "tokenAddress": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        col.create_index(model, None)
            .await
            .map_err(|e| e.to_string())?;
    }

    Ok(())
}
