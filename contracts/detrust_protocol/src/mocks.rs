//! In-crate stand-ins for the external ledgers and a contract-type instance,
//! plus the shared test fixture that wires them to the protocol.

extern crate std;

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, testutils::Address as _, token, vec,
    Address, BytesN, Env,
};

use crate::{
    ContractType, DeTrustProtocol, DeTrustProtocolClient, DisputeType, ProtocolConfig, Tier,
    TierTerms,
};

#[contracttype]
#[derive(Clone)]
enum MockKey {
    Balance(Address),
    Tier(Address),
    Score(Address),
    Payer,
    Payee,
    Retired,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum MockError {
    InsufficientBalance = 1,
}

#[contract]
pub struct MockDeTrustToken;

#[contractimpl]
impl MockDeTrustToken {
    pub fn mint(env: Env, to: Address, amount: i128) {
        let balance = Self::balance(env.clone(), to.clone());
        env.storage()
            .persistent()
            .set(&MockKey::Balance(to), &(balance + amount));
    }

    pub fn burn(env: Env, from: Address, amount: i128) -> Result<(), MockError> {
        let balance = Self::balance(env.clone(), from.clone());
        if balance < amount {
            return Err(MockError::InsufficientBalance);
        }
        env.storage()
            .persistent()
            .set(&MockKey::Balance(from), &(balance - amount));
        Ok(())
    }

    pub fn balance(env: Env, account: Address) -> i128 {
        env.storage()
            .persistent()
            .get(&MockKey::Balance(account))
            .unwrap_or(0)
    }
}

#[contract]
pub struct MockTrustScore;

#[contractimpl]
impl MockTrustScore {
    pub fn set_tier(env: Env, account: Address, tier: Tier) {
        env.storage().persistent().set(&MockKey::Tier(account), &tier);
    }

    pub fn get_tier(env: Env, account: Address) -> Tier {
        env.storage()
            .persistent()
            .get(&MockKey::Tier(account))
            .unwrap_or(Tier::Bronze)
    }

    pub fn increase(env: Env, account: Address, amount: u32) {
        let score = Self::score(env.clone(), account.clone());
        env.storage()
            .persistent()
            .set(&MockKey::Score(account), &(score + amount as i64));
    }

    pub fn decrease(env: Env, account: Address, amount: u32) {
        let score = Self::score(env.clone(), account.clone());
        env.storage()
            .persistent()
            .set(&MockKey::Score(account), &(score - amount as i64));
    }

    /// Net score change; starts at zero.
    pub fn score(env: Env, account: Address) -> i64 {
        env.storage()
            .persistent()
            .get(&MockKey::Score(account))
            .unwrap_or(0)
    }
}

/// Minimal `CommonContract`: knows its payer and payee. A retired instance
/// traps on every role query.
#[contract]
pub struct MockCommonContract;

#[contractimpl]
impl MockCommonContract {
    pub fn init(env: Env, payer: Address, payee: Address) {
        env.storage().instance().set(&MockKey::Payer, &payer);
        env.storage().instance().set(&MockKey::Payee, &payee);
    }

    pub fn retire(env: Env) {
        env.storage().instance().set(&MockKey::Retired, &true);
    }

    pub fn is_payer(env: Env, account: Address) -> bool {
        Self::require_active(&env);
        let payer: Option<Address> = env.storage().instance().get(&MockKey::Payer);
        payer == Some(account)
    }

    pub fn is_payee(env: Env, account: Address) -> bool {
        Self::require_active(&env);
        let payee: Option<Address> = env.storage().instance().get(&MockKey::Payee);
        payee == Some(account)
    }
}

impl MockCommonContract {
    fn require_active(env: &Env) {
        if env.storage().instance().has(&MockKey::Retired) {
            panic!("contract-type instance retired");
        }
    }
}

// ─────────────────────────────────────────────────────────
// Fixture
// ─────────────────────────────────────────────────────────

pub const DAY: u64 = 86_400;
/// Bronze price; payee pays half at creation.
pub const BRONZE_COST: i128 = 100;
/// Bronze verifiers per party, so two Bronze parties need 8.
pub const BRONZE_VERIFIERS: u32 = 4;
/// DeTrust balance seeded into each party wallet.
pub const PARTY_FUNDS: i128 = 1_000;
/// DeTrust balance seeded into each verifier wallet.
pub const VERIFIER_FUNDS: i128 = 100;

pub struct Fixture {
    pub env: Env,
    pub client: DeTrustProtocolClient<'static>,
    pub super_admin: Address,
    pub payment: token::Client<'static>,
    pub det: MockDeTrustTokenClient<'static>,
    pub trust: MockTrustScoreClient<'static>,
    pub payer: Address,
    pub payee: Address,
    pub wallet_payer: Address,
    pub wallet_payee: Address,
}

pub fn tier_schedule(env: &Env) -> soroban_sdk::Vec<TierTerms> {
    vec![
        env,
        TierTerms { tier: Tier::Bronze, cost: BRONZE_COST, verifiers: BRONZE_VERIFIERS },
        TierTerms { tier: Tier::Silver, cost: 60, verifiers: 3 },
        TierTerms { tier: Tier::Gold, cost: 30, verifiers: 2 },
    ]
}

impl Fixture {
    pub fn new() -> Self {
        let env = Env::default();
        env.mock_all_auths();

        let contract_id = env.register(DeTrustProtocol, ());
        let client = DeTrustProtocolClient::new(&env, &contract_id);

        let token_admin = Address::generate(&env);
        let sac = env.register_stellar_asset_contract_v2(token_admin);
        let payment = token::Client::new(&env, &sac.address());

        let det = MockDeTrustTokenClient::new(&env, &env.register(MockDeTrustToken, ()));
        let trust = MockTrustScoreClient::new(&env, &env.register(MockTrustScore, ()));

        let super_admin = Address::generate(&env);
        let config = ProtocolConfig {
            payment_token: payment.address.clone(),
            det_token: det.address.clone(),
            trust_score: trust.address.clone(),
            minimum_time_frame: DAY,
            verification_cut_off_time: 2 * DAY,
            tiers: tier_schedule(&env),
        };
        client.init(&super_admin, &config);

        let payer = Address::generate(&env);
        let payee = Address::generate(&env);
        let wallet_payer = Address::generate(&env);
        let wallet_payee = Address::generate(&env);
        det.mint(&wallet_payer, &PARTY_FUNDS);
        det.mint(&wallet_payee, &PARTY_FUNDS);

        let fixture = Fixture {
            env,
            client,
            super_admin,
            payment,
            det,
            trust,
            payer,
            payee,
            wallet_payer,
            wallet_payee,
        };
        fixture.fund(&fixture.payer, 10_000);
        fixture.fund(&fixture.payee, 10_000);
        fixture
    }

    /// Mint payment asset to `to`.
    pub fn fund(&self, to: &Address, amount: i128) {
        token::StellarAssetClient::new(&self.env, &self.payment.address).mint(to, &amount);
    }

    /// Direct contract created by the payee, paying half the Bronze price.
    pub fn create(&self) -> u64 {
        self.client.create_contract(
            &self.payee,
            &self.payer,
            &self.payee,
            &self.wallet_payer,
            &self.wallet_payee,
            &ContractType::Direct,
            &DisputeType::Judges,
            &(BRONZE_COST / 2),
        )
    }

    pub fn sig_material(&self, seed: u8) -> (BytesN<32>, BytesN<32>) {
        (
            BytesN::from_array(&self.env, &[seed; 32]),
            BytesN::from_array(&self.env, &[seed.wrapping_add(1); 32]),
        )
    }

    pub fn sign_payer(&self, id: u64) {
        let (r, s) = self.sig_material(0x10);
        self.client
            .sign(&self.payer, &id, &1, &27, &r, &s, &BRONZE_COST);
    }

    pub fn sign_payee(&self, id: u64) {
        let (r, s) = self.sig_material(0x20);
        self.client
            .sign(&self.payee, &id, &2, &28, &r, &s, &(BRONZE_COST / 2));
    }

    /// Create and fully sign a contract.
    pub fn signed_contract(&self) -> u64 {
        let id = self.create();
        self.sign_payer(id);
        self.sign_payee(id);
        id
    }

    /// A fresh verifier and its payout wallet, seeded with DeTrust tokens
    /// so a losing vote can be penalized.
    pub fn verifier(&self) -> (Address, Address) {
        let voter = Address::generate(&self.env);
        let wallet = Address::generate(&self.env);
        self.det.mint(&wallet, &VERIFIER_FUNDS);
        (voter, wallet)
    }

    pub fn advance(&self, seconds: u64) {
        use soroban_sdk::testutils::Ledger as _;
        self.env.ledger().with_mut(|li| li.timestamp += seconds);
    }
}
