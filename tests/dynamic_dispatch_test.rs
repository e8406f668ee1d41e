use chrono::Utc;
use coffee_workflow::domain::actor::{Department, UserId};
use coffee_workflow::domain::cash::{CashBalance, Direction, LedgerEntry};
use coffee_workflow::domain::money::{Currency, Money};
use coffee_workflow::domain::ports::{
    CashBalanceStoreBox, Posting, PostingStoreBox, RequestStoreBox,
};
use coffee_workflow::domain::request::{ApprovalRequest, RequestKind};
use coffee_workflow::infrastructure::in_memory::{
    InMemoryCashBalanceStore, InMemoryLedgerStore, InMemoryPostingStore, InMemoryRequestStore,
};
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_stores_as_trait_objects() {
    let requests = InMemoryRequestStore::new();
    let balances = InMemoryCashBalanceStore::new();
    let postings = InMemoryPostingStore::new(&requests, &balances, &InMemoryLedgerStore::new());

    let request_store: RequestStoreBox = Box::new(requests);
    let balance_store: CashBalanceStoreBox = Box::new(balances);
    let posting_store: PostingStoreBox = Box::new(postings);

    let request = ApprovalRequest::new(
        1,
        RequestKind::Payment,
        Department::Store,
        UserId::from("kato"),
        Money::positive(dec!(500000), Currency::Ugx).unwrap(),
        None,
        2,
        Utc::now(),
    );
    let amount = Money::positive(dec!(800000), Currency::Ugx).unwrap();
    let mut balance = CashBalance::new(Department::Finance, Currency::Ugx);
    balance.credit(amount, Utc::now()).unwrap();
    let posting = Posting {
        balance,
        entry: LedgerEntry {
            id: 1,
            department: Department::Finance,
            direction: Direction::Credit,
            amount,
            balance_after: amount,
            request: None,
            method: None,
            note: None,
            recorded_by: UserId::from("amina"),
            recorded_at: Utc::now(),
        },
        request: None,
    };

    // Verify Send + Sync by spawning tasks
    let rs_handle = tokio::spawn(async move {
        request_store.store(request).await.unwrap();
        request_store.get(1).await.unwrap().unwrap()
    });

    let ps_handle = tokio::spawn(async move {
        posting_store.commit(posting).await.unwrap();
        balance_store.get(Department::Finance).await.unwrap().unwrap()
    });

    let retrieved_request = rs_handle.await.unwrap();
    assert_eq!(retrieved_request.id, 1);

    let retrieved_balance = ps_handle.await.unwrap();
    assert_eq!(retrieved_balance.available.amount(), dec!(800000));
}
