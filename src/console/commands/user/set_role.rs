use crate::configuration::get_configuration;
use crate::db;
use crate::helpers::cache;
use crate::models::Role;
use crate::services::auth::session;
use actix_web::rt;
use anyhow::{bail, Context};
use sqlx::PgPool;

/// Operator override of a user's role, used to appoint the first super admin.
pub struct SetRoleCommand {
    user_id: i32,
    role: Role,
}

impl SetRoleCommand {
    pub fn new(user_id: i32, role: Role) -> Self {
        Self { user_id, role }
    }
}

impl crate::console::commands::CallableTrait for SetRoleCommand {
    fn call(&self) -> anyhow::Result<()> {
        rt::System::new().block_on(async {
            let settings = get_configuration().context("Failed to read configuration")?;
            let db_pool = PgPool::connect(&settings.database.connection_string())
                .await
                .context("Failed to connect to database")?;

            let mut user = match db::user::fetch(&db_pool, self.user_id).await? {
                Some(user) => user,
                None => bail!("user {} not found", self.user_id),
            };
            if user.role == self.role {
                println!("User {} already has role {}", user.id, user.role);
                return Ok(());
            }

            user.role = self.role;
            let user = db::user::update(&db_pool, &user).await?;

            let cache = cache::connect(&settings.redis).await;
            session::invalidate(cache.as_ref(), user.id).await;

            println!("User {} ({}) is now {}", user.id, user.name, user.role);
            Ok(())
        })
    }
}
