use anyhow::Context;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions, PgSslMode, PgStatement, PgTypeInfo},
    Connection, Executor, PgPool, Postgres, Type,
};
use tracing::info;

use crate::config::AppConfig;

pub const CREATE_USER_SQL: &str =
    "INSERT INTO users (login, password, name, email) VALUES ($1, $2, $3, $4)";
pub const GET_USER_SQL: &str = "SELECT login, name, email FROM users WHERE id=$1";
pub const GET_USER_LIST_SQL: &str = "SELECT login, name, email FROM users";
pub const UPDATE_USER_SQL: &str = "UPDATE users SET login=$2, name=$3, email=$4  WHERE id=$1";
pub const DELETE_USER_SQL: &str = "DELETE FROM users WHERE id=$1";

/// Owns the connection pool and the statements prepared against it at startup.
#[derive(Debug, Clone)]
pub struct Gateway {
    pub(crate) pool: PgPool,
    pub(crate) create_user: PgStatement<'static>,
    pub(crate) get_user: PgStatement<'static>,
    pub(crate) get_user_list: PgStatement<'static>,
    pub(crate) update_user: PgStatement<'static>,
    pub(crate) delete_user: PgStatement<'static>,
}

impl Gateway {
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let options = connect_options(config)?;
        let pool = PgPoolOptions::new()
            .connect_with(options)
            .await
            .context("connect to database")?;

        pool.acquire()
            .await
            .context("acquire connection for liveness check")?
            .ping()
            .await
            .context("check db connection")?;

        let gateway = Self::prepare(pool).await?;
        info!(host = %config.db_host, db = %config.db_name, "database gateway ready");
        Ok(gateway)
    }

    async fn prepare(pool: PgPool) -> anyhow::Result<Self> {
        let id = <i64 as Type<Postgres>>::type_info();
        let text = <String as Type<Postgres>>::type_info();

        // Parameter types are pinned to what the repo binds, not inferred from the table.
        let create_user = prepare_one(
            &pool,
            CREATE_USER_SQL,
            &[text.clone(), text.clone(), text.clone(), text.clone()],
        )
        .await?;
        let get_user = prepare_one(&pool, GET_USER_SQL, &[id.clone()]).await?;
        let get_user_list = prepare_one(&pool, GET_USER_LIST_SQL, &[]).await?;
        let update_user = prepare_one(
            &pool,
            UPDATE_USER_SQL,
            &[id.clone(), text.clone(), text.clone(), text],
        )
        .await?;
        let delete_user = prepare_one(&pool, DELETE_USER_SQL, &[id]).await?;

        Ok(Self {
            pool,
            create_user,
            get_user,
            get_user_list,
            update_user,
            delete_user,
        })
    }
}

async fn prepare_one(
    pool: &PgPool,
    sql: &'static str,
    params: &[PgTypeInfo],
) -> anyhow::Result<PgStatement<'static>> {
    pool.prepare_with(sql, params)
        .await
        .with_context(|| format!("prepare statement `{sql}`"))
}

pub fn connect_options(config: &AppConfig) -> anyhow::Result<PgConnectOptions> {
    let port: u16 = config
        .db_port
        .parse()
        .with_context(|| format!("invalid database port {:?}", config.db_port))?;
    Ok(PgConnectOptions::new()
        .host(&config.db_host)
        .port(port)
        .username(&config.db_user)
        .password(&config.db_pass)
        .database(&config.db_name)
        .ssl_mode(PgSslMode::Disable))
}
