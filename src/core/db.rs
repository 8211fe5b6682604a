// people table storage - schema, seed data and the three lookups
// every call borrows a pooled connection for one statement and gives it back

use crate::Error;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// One row of the people table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub document_id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub birth_date: Option<String>,
    pub occupation: Option<String>,
}

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

const SCHEMA: &str = r#"CREATE TABLE IF NOT EXISTS people (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK (name <> ''),
    document_id TEXT NOT NULL UNIQUE CHECK (document_id <> ''),
    email TEXT,
    phone TEXT,
    address TEXT,
    city TEXT,
    region TEXT,
    birth_date TEXT,
    occupation TEXT
)"#;

const INSERT: &str = r#"INSERT INTO people
    (name, document_id, email, phone, address, city, region, birth_date, occupation)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#;

// name, document id, email, phone, address, city, region, birth date, occupation
const SEED: [[&str; 9]; 5] = [
    [
        "João Silva",
        "123.456.789-00",
        "joao@email.com",
        "(11) 99999-1111",
        "Rua A, 123",
        "São Paulo",
        "SP",
        "1990-01-15",
        "Engenheiro",
    ],
    [
        "Maria Santos",
        "987.654.321-00",
        "maria@email.com",
        "(11) 88888-2222",
        "Rua B, 456",
        "Rio de Janeiro",
        "RJ",
        "1985-05-20",
        "Médica",
    ],
    [
        "Pedro Oliveira",
        "456.789.123-00",
        "pedro@email.com",
        "(11) 77777-3333",
        "Rua C, 789",
        "Belo Horizonte",
        "MG",
        "1992-12-10",
        "Professor",
    ],
    [
        "Ana Costa",
        "321.654.987-00",
        "ana@email.com",
        "(11) 66666-4444",
        "Rua D, 321",
        "Salvador",
        "BA",
        "1988-08-25",
        "Advogada",
    ],
    [
        "Carlos Ferreira",
        "789.123.456-00",
        "carlos@email.com",
        "(11) 55555-5555",
        "Rua E, 654",
        "Fortaleza",
        "CE",
        "1995-03-30",
        "Programador",
    ],
];

impl Store {
    /// Open (or create) the sqlite database at `url`.
    pub async fn connect(url: &str) -> Result<Self, Error> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Private in-memory database, mostly for tests and dry runs.
    pub async fn in_memory() -> Result<Self, Error> {
        // one connection that never expires, otherwise each new
        // connection would get its own empty database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Ok(Self { pool })
    }

    /// Create the table and seed it when empty. Returns how many rows were seeded.
    pub async fn initialize(&self) -> Result<u64, Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(SCHEMA).execute(&mut *tx).await?;

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM people")
            .fetch_one(&mut *tx)
            .await?;

        let mut seeded = 0;
        if count == 0 {
            for [name, document_id, email, phone, address, city, region, birth_date, occupation] in
                SEED
            {
                sqlx::query(INSERT)
                    .bind(name)
                    .bind(document_id)
                    .bind(email)
                    .bind(phone)
                    .bind(address)
                    .bind(city)
                    .bind(region)
                    .bind(birth_date)
                    .bind(occupation)
                    .execute(&mut *tx)
                    .await?;
                seeded += 1;
            }
        }

        tx.commit().await?;
        Ok(seeded)
    }

    /// Exact, byte-for-byte match on the document id.
    pub async fn find_by_document_id(&self, code: &str) -> Result<Option<Person>, Error> {
        let person = sqlx::query_as::<_, Person>(
            r#"SELECT id, name, document_id, email, phone, address, city, region, birth_date, occupation
               FROM people
               WHERE document_id = ?"#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(person)
    }

    /// Case-insensitive substring match on the name, ordered by name.
    /// An empty fragment matches every row.
    pub async fn find_by_name_part(&self, fragment: &str) -> Result<Vec<Person>, Error> {
        let pattern = format!("%{}%", escape_like(fragment));

        let people = sqlx::query_as::<_, Person>(
            r#"SELECT id, name, document_id, email, phone, address, city, region, birth_date, occupation
               FROM people
               WHERE name LIKE ? ESCAPE '\'
               ORDER BY name"#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(people)
    }

    pub async fn list_all(&self) -> Result<Vec<Person>, Error> {
        let people = sqlx::query_as::<_, Person>(
            r#"SELECT id, name, document_id, email, phone, address, city, region, birth_date, occupation
               FROM people
               ORDER BY name"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(people)
    }

    pub async fn count(&self) -> Result<i64, Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM people")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

// user text is a literal fragment, not a LIKE pattern
fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
