//! Database tests

use super::*;
use crate::models::*;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_tx(date: &str, description: &str, amount: f64, direction: Direction) -> NewTransaction {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        let signed = match direction {
            Direction::Income => amount,
            _ => -amount,
        };
        NewTransaction {
            date,
            description: description.to_string(),
            amount,
            direction,
            import_hash: crate::import::generate_hash(&date, description, signed),
            original_data: None,
        }
    }

    fn setup() -> (Database, i64, i64) {
        let db = Database::in_memory().unwrap();
        let user = db.create_user("alice").unwrap();
        let account = db
            .upsert_account(user, "Checking", Some(AccountType::Checking))
            .unwrap();
        (db, user, account)
    }

    #[test]
    fn test_in_memory_db() {
        let db = Database::in_memory().unwrap();
        assert!(db.list_users().unwrap().is_empty());
        assert_eq!(db.count_transactions().unwrap(), 0);
    }

    #[test]
    fn test_schema_tables_exist() {
        let db = Database::in_memory().unwrap();
        let conn = db.conn().unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'accounts', 'transactions', 'audit_log')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 4);
    }

    #[test]
    fn test_user_crud() {
        let db = Database::in_memory().unwrap();
        let id = db.create_user("alice").unwrap();
        assert!(id > 0);

        let user = db.get_user(id).unwrap().unwrap();
        assert_eq!(user.name, "alice");
        assert!(db.get_user(id + 100).unwrap().is_none());

        db.create_user("bob").unwrap();
        let names: Vec<String> = db.list_users().unwrap().into_iter().map(|u| u.name).collect();
        assert_eq!(names, vec!["alice", "bob"]);
    }

    #[test]
    fn test_duplicate_and_blank_users_rejected() {
        let db = Database::in_memory().unwrap();
        db.create_user("alice").unwrap();
        assert!(matches!(db.create_user("alice"), Err(Error::Validation(_))));
        assert!(matches!(db.create_user("   "), Err(Error::Validation(_))));
    }

    #[test]
    fn test_account_crud() {
        let (db, user, account) = setup();

        // Upsert same account returns same ID
        let again = db.upsert_account(user, "Checking", None).unwrap();
        assert_eq!(account, again);

        let accounts = db.list_accounts(user).unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].name, "Checking");
        assert_eq!(accounts[0].account_type, Some(AccountType::Checking));
        assert_eq!(accounts[0].current_balance, 0.0);

        assert!(db.get_account(account).unwrap().is_some());
        assert!(db.get_account(account + 100).unwrap().is_none());
    }

    #[test]
    fn test_account_requires_user() {
        let db = Database::in_memory().unwrap();
        let err = db.upsert_account(42, "Orphan", None).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_total_balance_sums_accounts() {
        let (db, user, checking) = setup();
        let savings = db
            .upsert_account(user, "Savings", Some(AccountType::Savings))
            .unwrap();

        assert_eq!(db.total_balance(user).unwrap(), 0.0);

        db.set_account_balance(checking, 1500.25).unwrap();
        db.set_account_balance(savings, 500.0).unwrap();
        assert_eq!(db.total_balance(user).unwrap(), 2000.25);

        // Other users are not included
        let bob = db.create_user("bob").unwrap();
        let bob_acct = db.upsert_account(bob, "Checking", None).unwrap();
        db.set_account_balance(bob_acct, 99.0).unwrap();
        assert_eq!(db.total_balance(user).unwrap(), 2000.25);
    }

    #[test]
    fn test_set_balance_errors() {
        let (db, _, account) = setup();
        assert!(matches!(
            db.set_account_balance(account + 100, 10.0),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            db.set_account_balance(account, f64::INFINITY),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_insert_transaction_dedup() {
        let (db, user, account) = setup();
        let tx = new_tx("2024-01-05", "Salary", 5000.0, Direction::Income);

        let first = db.insert_transaction(account, &tx).unwrap();
        assert!(first.is_some());
        let second = db.insert_transaction(account, &tx).unwrap();
        assert!(second.is_none());

        let stored = db.list_transactions(user, 10, 0).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].user_id, user);
        assert_eq!(stored[0].direction, Direction::Income);
        assert!(!stored[0].excluded_from_forecast);
    }

    #[test]
    fn test_same_hash_allowed_in_other_account() {
        let (db, user, checking) = setup();
        let savings = db.upsert_account(user, "Savings", None).unwrap();
        let tx = new_tx("2024-01-05", "Interest", 3.0, Direction::Income);

        assert!(db.insert_transaction(checking, &tx).unwrap().is_some());
        assert!(db.insert_transaction(savings, &tx).unwrap().is_some());
    }

    #[test]
    fn test_insert_into_missing_account() {
        let db = Database::in_memory().unwrap();
        let tx = new_tx("2024-01-05", "Salary", 5000.0, Direction::Income);
        assert!(matches!(
            db.insert_transaction(7, &tx),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_import_transactions_summary() {
        let (db, user, account) = setup();
        let batch = vec![
            new_tx("2024-01-05", "Salary", 5000.0, Direction::Income),
            new_tx("2024-01-10", "Rent", 1200.0, Direction::Expense),
            new_tx("2024-01-10", "Rent", 1200.0, Direction::Expense),
        ];

        let summary = db.import_transactions(account, &batch).unwrap();
        assert_eq!(summary, ImportSummary { imported: 2, skipped: 1 });

        let again = db.import_transactions(account, &batch).unwrap();
        assert_eq!(again, ImportSummary { imported: 0, skipped: 3 });
        assert_eq!(db.list_transactions(user, 100, 0).unwrap().len(), 2);
    }

    #[test]
    fn test_identical_csv_rows_all_imported() {
        use crate::cashflow::aggregate_monthly;
        use crate::import::parse_csv;

        let (db, user, account) = setup();
        let csv = "date,description,amount\n\
                   2024-01-05,Coffee,-4.50\n\
                   2024-01-05,Coffee,-4.50\n\
                   2024-01-20,Salary,100.00\n";
        let batch = parse_csv(csv.as_bytes()).unwrap();

        let summary = db.import_transactions(account, &batch).unwrap();
        assert_eq!(summary, ImportSummary { imported: 3, skipped: 0 });

        let history = aggregate_monthly(&db.transaction_records(user, true).unwrap());
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].total_expense, 9.0);

        // Re-importing the same file adds nothing
        let batch = parse_csv(csv.as_bytes()).unwrap();
        let again = db.import_transactions(account, &batch).unwrap();
        assert_eq!(again, ImportSummary { imported: 0, skipped: 3 });
    }

    #[test]
    fn test_list_transactions_paging() {
        let (db, user, account) = setup();
        for day in 1..=5 {
            let tx = new_tx(&format!("2024-01-0{}", day), "Coffee", 4.0, Direction::Expense);
            db.insert_transaction(account, &tx).unwrap();
        }

        let page = db.list_transactions(user, 2, 0).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].date.to_string(), "2024-01-05");

        let last = db.list_transactions(user, 2, 4).unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].date.to_string(), "2024-01-01");
    }

    #[test]
    fn test_excluded_transactions_filtered_from_records() {
        let (db, user, account) = setup();
        let salary = db
            .insert_transaction(account, &new_tx("2024-01-05", "Salary", 5000.0, Direction::Income))
            .unwrap()
            .unwrap();
        db.insert_transaction(account, &new_tx("2024-01-09", "Lottery", 900.0, Direction::Income))
            .unwrap();

        let lottery = db.list_transactions(user, 10, 0).unwrap()[0].id;
        db.set_excluded_from_forecast(lottery, true).unwrap();

        let all = db.transaction_records(user, true).unwrap();
        assert_eq!(all.len(), 2);
        let kept = db.transaction_records(user, false).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].amount, 5000.0);

        db.set_excluded_from_forecast(lottery, false).unwrap();
        assert_eq!(db.transaction_records(user, false).unwrap().len(), 2);

        assert!(db.get_transaction(salary).unwrap().is_some());
        assert!(matches!(
            db.set_excluded_from_forecast(salary + 100, true),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_transaction_records_round_trip_direction() {
        let (db, user, account) = setup();
        db.insert_transaction(account, &new_tx("2024-02-01", "To savings", 300.0, Direction::Transfer))
            .unwrap();

        let records = db.transaction_records(user, true).unwrap();
        assert_eq!(records[0].direction, Direction::Transfer);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }

    #[test]
    fn test_invalid_direction_rejected_by_schema() {
        let (db, user, account) = setup();
        let conn = db.conn().unwrap();
        let result = conn.execute(
            "INSERT INTO transactions (account_id, user_id, date, description, amount, direction, import_hash) VALUES (?, ?, '2024-01-01', 'x', 1.0, 'refund', 'h')",
            rusqlite::params![account, user],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_audit_log() {
        let db = Database::in_memory().unwrap();
        db.log_audit("api", "import", Some("account"), Some(1), Some("2 imported"))
            .unwrap();
        db.log_audit("api", "simulate", Some("user"), Some(1), None)
            .unwrap();

        let entries = db.list_audit_log(10).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, "simulate");
        assert_eq!(entries[1].details.as_deref(), Some("2 imported"));

        assert_eq!(db.list_audit_log(1).unwrap().len(), 1);
    }

    #[test]
    fn test_derive_key_is_stable() {
        let a = derive_key("correct horse").unwrap();
        let b = derive_key("correct horse").unwrap();
        let c = derive_key("battery staple").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[test]
    fn test_encrypted_database_opens_with_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enc.db");
        let path = path.to_str().unwrap();

        let db = Database::new_with_key(path, Some("secret")).unwrap();
        db.create_user("alice").unwrap();
        drop(db);

        let reopened = Database::new_with_key(path, Some("secret")).unwrap();
        assert_eq!(reopened.list_users().unwrap().len(), 1);
        assert_eq!(reopened.path(), path);
    }
}
