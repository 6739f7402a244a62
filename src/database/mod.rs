use mongodb::{Client, Collection, Database};
use std::error::Error;

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

/// Database name from the URI path, or the default when the URI has no path
/// component. Without the filter a host-only URI like
/// `mongodb://localhost:27017` would yield `localhost:27017` as the name.
fn database_name(uri: &str) -> &str {
    uri.split('/')
        .last()
        .and_then(|s| s.split('?').next())
        .filter(|s| !s.is_empty() && !s.contains(':'))
        .unwrap_or("FieldForce")
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        let db = client.database(database_name(uri));

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };

        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes the services rely on. The unique ones carry
    /// invariants, not just performance: users(email) backs the duplicate
    /// registration check and attendance(user, date) closes the concurrent
    /// double check-in window.
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        use mongodb::bson::doc;
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        log::info!("🔧 Creating database indexes...");

        let users = self.db.collection::<mongodb::bson::Document>("users");
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        match users.create_index(email_index).await {
            Ok(_) => log::info!("   ✅ Index created: users(email) unique"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        // One attendance document per user per day
        let attendance = self.db.collection::<mongodb::bson::Document>("attendance");
        let attendance_index = IndexModel::builder()
            .keys(doc! { "user": 1, "date": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        match attendance.create_index(attendance_index).await {
            Ok(_) => log::info!("   ✅ Index created: attendance(user, date) unique"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let clients = self.db.collection::<mongodb::bson::Document>("clients");
        let clients_index = IndexModel::builder()
            .keys(doc! { "created_by": 1 })
            .build();
        match clients.create_index(clients_index).await {
            Ok(_) => log::info!("   ✅ Index created: clients(created_by)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let meetings = self.db.collection::<mongodb::bson::Document>("meetings");
        let meetings_index = IndexModel::builder()
            .keys(doc! { "client": 1 })
            .build();
        match meetings.create_index(meetings_index).await {
            Ok(_) => log::info!("   ✅ Index created: meetings(client)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let reimbursements = self
            .db
            .collection::<mongodb::bson::Document>("reimbursements");
        let reimbursements_index = IndexModel::builder()
            .keys(doc! { "employee_id": 1 })
            .build();
        match reimbursements.create_index(reimbursements_index).await {
            Ok(_) => log::info!("   ✅ Index created: reimbursements(employee_id)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    /// Check if the connection is healthy.
    pub async fn ping(&self) -> Result<(), mongodb::error::Error> {
        self.db.list_collection_names().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_name_comes_from_the_uri_path() {
        assert_eq!(database_name("mongodb://localhost:27017/FieldForce"), "FieldForce");
        assert_eq!(
            database_name("mongodb://user:pw@db.example.com:27017/prod?retryWrites=true"),
            "prod"
        );
    }

    #[test]
    fn host_only_uri_falls_back_to_default() {
        assert_eq!(database_name("mongodb://localhost:27017"), "FieldForce");
        assert_eq!(database_name("mongodb://localhost:27017/"), "FieldForce");
        assert_eq!(database_name("mongodb://localhost:27017/?appName=x"), "FieldForce");
    }
}
