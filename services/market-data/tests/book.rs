//! Aggregation engine tests
//!
//! Exercises depth merging, balance/allowance capping, dust filtering and
//! the query service against in-memory collaborators.

use async_trait::async_trait;
use market_data::amounts::AmountCalculator;
use market_data::depth::calculate_depth;
use market_data::error::BookError;
use market_data::order_book::generate_book;
use market_data::service::{DepthQuery, OrderBookService};
use num_bigint::BigInt;
use num_rational::BigRational;
use std::collections::HashMap;
use std::sync::Arc;
use types::errors::ProviderError;
use types::ids::{Address, Hash256};
use types::numeric::pow10;
use types::order::{Order, OrderState, OrderType};
use types::provider::{AccountStateProvider, OrderViewer};
use types::token::{StaticRegistry, Token};

const DELEGATE: [u8; 20] = [0x02; 20];
const GTO: [u8; 20] = [0x05; 20];
const WETH: [u8; 20] = [0x06; 20];
const LRC: [u8; 20] = [0x10; 20];

struct MemoryAccounts {
    default_balance: BigInt,
    default_allowance: BigInt,
    overrides: HashMap<Address, (BigInt, BigInt)>,
    fail: bool,
}

impl MemoryAccounts {
    fn ample() -> Self {
        Self {
            default_balance: BigInt::from(1_000_000) * pow10(18),
            default_allowance: BigInt::from(1_000_000) * pow10(18),
            overrides: HashMap::new(),
            fail: false,
        }
    }
}

#[async_trait]
impl AccountStateProvider for MemoryAccounts {
    async fn balance_and_allowance(
        &self,
        _owner: &Address,
        token: &Address,
        _spender: &Address,
    ) -> Result<(BigInt, BigInt), ProviderError> {
        if self.fail {
            return Err(ProviderError::Unavailable("account node down".to_string()));
        }
        Ok(self
            .overrides
            .get(token)
            .cloned()
            .unwrap_or((self.default_balance.clone(), self.default_allowance.clone())))
    }

    async fn balances_by_symbol(
        &self,
        _owner: &Address,
    ) -> Result<HashMap<String, BigInt>, ProviderError> {
        Ok(HashMap::new())
    }
}

#[derive(Default)]
struct MemoryViewer {
    books: HashMap<(Address, Address), Vec<OrderState>>,
    fail: bool,
}

#[async_trait]
impl OrderViewer for MemoryViewer {
    async fn find_by_hash(&self, _hash: &Hash256) -> Result<Option<OrderState>, ProviderError> {
        Ok(None)
    }

    async fn is_order_cutoff(
        &self,
        _protocol: &Address,
        _owner: &Address,
        _token_s: &Address,
        _token_b: &Address,
        _valid_since: i64,
    ) -> bool {
        false
    }

    async fn orders_for_pair(
        &self,
        _delegate: &Address,
        token_s: &Address,
        token_b: &Address,
        _limit: usize,
    ) -> Result<Vec<OrderState>, ProviderError> {
        if self.fail {
            return Err(ProviderError::Unavailable("store down".to_string()));
        }
        Ok(self
            .books
            .get(&(*token_s, *token_b))
            .cloned()
            .unwrap_or_default())
    }

    async fn update_broadcast_time(
        &self,
        _hash: &Hash256,
        _count: u32,
    ) -> Result<(), ProviderError> {
        Ok(())
    }
}

fn registry() -> Arc<StaticRegistry> {
    Arc::new(StaticRegistry::new(
        vec![
            Token::new("GTO", Address::new(GTO), 18),
            Token::new("WETH", Address::new(WETH), 18),
            Token::new("LRC", Address::new(LRC), 18),
        ],
        vec!["WETH".to_string(), "LRC".to_string()],
    ))
}

/// An order selling `amount_s` GTO for `amount_b` WETH, priced and stored.
fn ask_state(owner_byte: u8, amount_s: i64, amount_b: i64) -> OrderState {
    let amount_s = BigInt::from(amount_s) * pow10(18);
    let amount_b = BigInt::from(amount_b) * pow10(18);
    let price = BigRational::new(amount_s.clone(), amount_b.clone());

    let mut order = Order {
        protocol: Address::new([0x01; 20]),
        delegate_address: Address::new(DELEGATE),
        owner: Address::new([owner_byte; 20]),
        auth_addr: Address::zero(),
        auth_private_key: None,
        token_s: Address::new(GTO),
        token_b: Address::new(WETH),
        amount_s,
        amount_b,
        valid_since: 1_700_000_000,
        valid_until: 1_900_000_000,
        lrc_fee: BigInt::from(2) * pow10(18),
        buy_no_more_than_amount_b: false,
        margin_split_percentage: 0,
        order_type: OrderType::P2p,
        pow_nonce: 1,
        v: 0,
        r: Hash256::new([owner_byte; 32]),
        s: Hash256::new([owner_byte.wrapping_add(1); 32]),
        hash: Hash256::zero(),
        price: Some(price),
        market: Some("GTO-WETH".to_string()),
        side: None,
    };
    order.hash = order.generate_hash();
    OrderState::new_from_order(order)
}

/// The mirror bid: selling WETH for GTO.
fn bid_state(owner_byte: u8, amount_s: i64, amount_b: i64) -> OrderState {
    let mut state = ask_state(owner_byte, amount_s, amount_b);
    state.raw_order.token_s = Address::new(WETH);
    state.raw_order.token_b = Address::new(GTO);
    state.raw_order.hash = state.raw_order.generate_hash();
    state
}

fn gto_decimals() -> BigInt {
    pow10(18)
}

fn weth_decimals() -> BigInt {
    pow10(18)
}

#[tokio::test]
async fn depth_merges_orders_with_identical_rendered_prices() {
    let calculator = AmountCalculator::new(Arc::new(MemoryAccounts::ample()));
    // Same 2:1 ratio at different magnitudes: identical rendered price
    let states = vec![ask_state(0x21, 2, 1), ask_state(0x22, 4, 2)];

    let depth = calculate_depth(
        &calculator,
        &states,
        100,
        true,
        &gto_decimals(),
        &weth_decimals(),
    )
    .await;

    assert_eq!(depth.len(), 1);
    // Ask price is inverted: 1 WETH buys 2 GTO -> 0.5
    assert_eq!(depth[0].price, "0.5000000000");
    assert_eq!(depth[0].amount, "6.0000000000");
    assert_eq!(depth[0].size, "3.0000000000");
}

#[tokio::test]
async fn depth_keeps_distinct_prices_apart() {
    let calculator = AmountCalculator::new(Arc::new(MemoryAccounts::ample()));
    let states = vec![ask_state(0x21, 2, 1), ask_state(0x22, 3, 1)];

    let depth = calculate_depth(
        &calculator,
        &states,
        100,
        true,
        &gto_decimals(),
        &weth_decimals(),
    )
    .await;

    assert_eq!(depth.len(), 2);
}

#[tokio::test]
async fn ask_truncation_keeps_one_extra_level() {
    let calculator = AmountCalculator::new(Arc::new(MemoryAccounts::ample()));
    let states: Vec<OrderState> = (1..=5).map(|i| ask_state(0x20 + i, i as i64, 1)).collect();

    let asks = calculate_depth(
        &calculator,
        &states,
        3,
        true,
        &gto_decimals(),
        &weth_decimals(),
    )
    .await;
    assert_eq!(asks.len(), 4);

    let bid_states: Vec<OrderState> =
        (1..=5).map(|i| bid_state(0x30 + i, i as i64, 1)).collect();
    let bids = calculate_depth(
        &calculator,
        &bid_states,
        3,
        false,
        &weth_decimals(),
        &gto_decimals(),
    )
    .await;
    assert_eq!(bids.len(), 3);
}

#[tokio::test]
async fn allowance_caps_the_sell_side_and_preserves_the_ratio() {
    let mut accounts = MemoryAccounts::ample();
    // Owner may only move 40 GTO through the delegate
    accounts.overrides.insert(
        Address::new(GTO),
        (
            BigInt::from(1_000_000) * pow10(18),
            BigInt::from(40) * pow10(18),
        ),
    );
    let calculator = AmountCalculator::new(Arc::new(accounts));

    // Sells 100 GTO for 50 WETH: rate is 2 GTO per WETH
    let states = vec![ask_state(0x21, 100, 50)];
    let rows = generate_book(
        &calculator,
        &states,
        true,
        &gto_decimals(),
        &weth_decimals(),
        &pow10(18),
        40,
    )
    .await;

    assert_eq!(rows.len(), 1);
    assert!(rows[0].amount <= 40.0);
    assert_eq!(rows[0].amount, 40.0);
    // Buy side recomputed from the original ratio, not the raw remainder
    assert_eq!(rows[0].size, 20.0);
    assert_eq!(rows[0].price, 0.5);
}

#[tokio::test]
async fn balance_cap_applies_when_lower_than_allowance() {
    let mut accounts = MemoryAccounts::ample();
    accounts.overrides.insert(
        Address::new(GTO),
        (
            BigInt::from(10) * pow10(18),
            BigInt::from(1_000_000) * pow10(18),
        ),
    );
    let calculator = AmountCalculator::new(Arc::new(accounts));

    let states = vec![ask_state(0x21, 100, 50)];
    let rows = generate_book(
        &calculator,
        &states,
        true,
        &gto_decimals(),
        &weth_decimals(),
        &pow10(18),
        40,
    )
    .await;

    assert_eq!(rows[0].amount, 10.0);
    assert_eq!(rows[0].size, 5.0);
}

#[tokio::test]
async fn dust_orders_disappear_from_both_views() {
    let mut accounts = MemoryAccounts::ample();
    // Allowance of 1e-9 tokens: below the 1e-8 dust threshold
    accounts
        .overrides
        .insert(Address::new(GTO), (pow10(18), BigInt::from(1_000_000_000)));
    let calculator = AmountCalculator::new(Arc::new(accounts));

    let states = vec![ask_state(0x21, 100, 50)];

    let depth = calculate_depth(
        &calculator,
        &states,
        100,
        true,
        &gto_decimals(),
        &weth_decimals(),
    )
    .await;
    assert!(depth.is_empty());

    let calculator = AmountCalculator::new(Arc::new({
        let mut accounts = MemoryAccounts::ample();
        accounts
            .overrides
            .insert(Address::new(GTO), (pow10(18), BigInt::from(1_000_000_000)));
        accounts
    }));
    let rows = generate_book(
        &calculator,
        &states,
        true,
        &gto_decimals(),
        &weth_decimals(),
        &pow10(18),
        40,
    )
    .await;
    assert!(rows.is_empty());
}

#[tokio::test]
async fn fully_dealt_orders_are_skipped() {
    let calculator = AmountCalculator::new(Arc::new(MemoryAccounts::ample()));

    let mut state = ask_state(0x21, 100, 50);
    state.dealt_amount_s = state.raw_order.amount_s.clone();

    let depth = calculate_depth(
        &calculator,
        &[state],
        100,
        true,
        &gto_decimals(),
        &weth_decimals(),
    )
    .await;
    assert!(depth.is_empty());
}

#[tokio::test]
async fn account_lookup_failure_hides_the_order() {
    let mut accounts = MemoryAccounts::ample();
    accounts.fail = true;
    let calculator = AmountCalculator::new(Arc::new(accounts));

    let states = vec![ask_state(0x21, 100, 50)];
    let depth = calculate_depth(
        &calculator,
        &states,
        100,
        true,
        &gto_decimals(),
        &weth_decimals(),
    )
    .await;
    assert!(depth.is_empty());
}

#[tokio::test]
async fn buy_capped_order_follows_its_buy_side_remainder() {
    let calculator = AmountCalculator::new(Arc::new(MemoryAccounts::ample()));

    let mut state = ask_state(0x21, 100, 50);
    state.raw_order.buy_no_more_than_amount_b = true;
    // 20 of the 50 WETH already bought
    state.dealt_amount_b = BigInt::from(20) * pow10(18);

    let rows = generate_book(
        &calculator,
        &[state],
        true,
        &gto_decimals(),
        &weth_decimals(),
        &pow10(18),
        40,
    )
    .await;

    // 30 WETH left to buy, which prices 60 GTO at the original rate
    assert_eq!(rows[0].amount, 60.0);
    assert_eq!(rows[0].size, 30.0);
}

fn service(viewer: MemoryViewer, accounts: MemoryAccounts) -> OrderBookService {
    OrderBookService::new(registry(), Arc::new(viewer), Arc::new(accounts))
}

fn seeded_viewer() -> MemoryViewer {
    let mut viewer = MemoryViewer::default();
    viewer.books.insert(
        (Address::new(GTO), Address::new(WETH)),
        vec![ask_state(0x21, 2, 1), ask_state(0x22, 4, 2)],
    );
    viewer.books.insert(
        (Address::new(WETH), Address::new(GTO)),
        vec![bid_state(0x31, 1, 4)],
    );
    viewer
}

#[tokio::test]
async fn depth_query_end_to_end() {
    let service = service(seeded_viewer(), MemoryAccounts::ample());

    let depth = service
        .depth(&DepthQuery {
            delegate_address: Address::new(DELEGATE).to_string(),
            market: "gto-weth".to_string(),
            length: None,
        })
        .await
        .unwrap();

    assert_eq!(depth.market, "GTO-WETH");
    assert_eq!(depth.sell.len(), 1);
    assert_eq!(depth.sell[0].price, "0.5000000000");
    assert_eq!(depth.buy.len(), 1);
    // Bid sells 1 WETH for 4 GTO: 0.25 WETH per GTO
    assert_eq!(depth.buy[0].price, "0.2500000000");
}

#[tokio::test]
async fn order_book_query_end_to_end() {
    let service = service(seeded_viewer(), MemoryAccounts::ample());

    let book = service
        .order_book(&DepthQuery {
            delegate_address: Address::new(DELEGATE).to_string(),
            market: "GTO-WETH".to_string(),
            length: None,
        })
        .await
        .unwrap();

    assert_eq!(book.sell.len(), 2);
    assert_eq!(book.buy.len(), 1);
    assert!(book.sell.iter().all(|row| row.price == 0.5));
    assert_eq!(book.buy[0].lrc_fee, 2.0);
}

#[tokio::test]
async fn rejects_malformed_delegate_address() {
    let service = service(MemoryViewer::default(), MemoryAccounts::ample());

    let err = service
        .depth(&DepthQuery {
            delegate_address: "nonsense".to_string(),
            market: "GTO-WETH".to_string(),
            length: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err, BookError::InvalidDelegateAddress);
}

#[tokio::test]
async fn rejects_unknown_market() {
    let service = service(MemoryViewer::default(), MemoryAccounts::ample());

    let err = service
        .depth(&DepthQuery {
            delegate_address: Address::new(DELEGATE).to_string(),
            market: "GTO-DOGE".to_string(),
            length: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err, BookError::MarketNotFound);
}

#[tokio::test]
async fn store_failure_surfaces_as_retryable_error() {
    let viewer = MemoryViewer {
        fail: true,
        ..MemoryViewer::default()
    };
    let service = service(viewer, MemoryAccounts::ample());

    let err = service
        .depth(&DepthQuery {
            delegate_address: Address::new(DELEGATE).to_string(),
            market: "GTO-WETH".to_string(),
            length: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err, BookError::UpstreamQueryFailed { side: "ask" });
}
