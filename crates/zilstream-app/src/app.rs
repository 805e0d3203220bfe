//! Main application orchestration.
//!
//! Coordinates all components:
//! - Restoring persisted state into the store
//! - Scheduled rate and block height polls
//! - The dispatch loop and the fetches each change report triggers
//! - Alert evaluation after token and rate changes
//! - Persisting initialized slices
//! - Dashboard server

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use zilstream_alert::{AlertEvaluator, TracingNotifier};
use zilstream_core::{
    Address, Alert, Indicator, Metric, NotificationPermission, ProviderKind, RootState,
    SettingsState,
};
use zilstream_dashboard::{run_server, DashboardState};
use zilstream_feed::{ChainClient, DataPoller, RateClient, TokenApiClient};
use zilstream_persistence::{keys, FileStore, StateArchive};
use zilstream_store::{
    portfolio_view, token_apr, Action, Change, Changes, PortfolioView, StoreHandle,
};
use zilstream_telemetry::Metrics;
use zilstream_wallet::{AvatarClient, InjectedWallet, WalletConnection, WalletHub, WatchWallet};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::scheduler::Scheduler;

/// Buffered action batches between fetch tasks and the dispatch loop.
const ACTION_CHANNEL_CAPACITY: usize = 256;

/// Follow-up rounds per applied batch before giving up.
const MAX_FOLLOW_UP_ROUNDS: usize = 8;

/// Time allowed for in-flight fetches to deliver after shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

type ActionSender = mpsc::Sender<Vec<Action>>;

/// Main application.
pub struct Application {
    config: AppConfig,
    store: StoreHandle,
    archive: StateArchive,
    poller: Arc<DataPoller>,
    wallets: WalletHub,
    evaluator: AlertEvaluator,
}

impl Application {
    /// Create the application with HTTP clients and file storage from `config`.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        config.validate()?;

        let archive = StateArchive::new(Arc::new(FileStore::open(
            &config.persistence.data_dir,
        )?));
        let poller = DataPoller::new(
            Arc::new(TokenApiClient::new(&config.endpoints.api_url)?),
            Arc::new(RateClient::new(
                &config.endpoints.rates_url,
                &config.currencies,
            )?),
            Arc::new(ChainClient::new(&config.endpoints.rpc_url)?),
            config.contracts()?,
        );

        let zilpay = config.watch_address()?.map(|address| {
            Arc::new(WatchWallet::new(address, config.wallet.network)) as Arc<dyn InjectedWallet>
        });
        let wallets = WalletHub::new(
            zilpay,
            None,
            AvatarClient::new(&config.endpoints.avatar_url)?,
            archive.clone(),
        );
        let evaluator = AlertEvaluator::new(Arc::new(TracingNotifier));

        Ok(Self::with_parts(config, archive, poller, wallets, evaluator))
    }

    /// Assemble from prebuilt parts.
    pub fn with_parts(
        config: AppConfig,
        archive: StateArchive,
        poller: DataPoller,
        wallets: WalletHub,
        evaluator: AlertEvaluator,
    ) -> Self {
        Self {
            config,
            store: StoreHandle::default(),
            archive,
            poller: Arc::new(poller),
            wallets,
            evaluator,
        }
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    /// Load persisted slices and configured operators into the store.
    ///
    /// Nothing is written back; the returned report drives the first
    /// fetches.
    pub fn restore(&self) -> AppResult<Changes> {
        let mut actions = vec![
            Action::InitAccount(self.archive.load_account()),
            Action::SetAlertState(self.archive.load_alerts()),
            Action::SettingsUpdated(self.archive.load_settings()),
            Action::SetNotificationState(self.archive.load_notifications()),
        ];
        if let Some(code) = self.archive.load_selected_currency() {
            actions.push(Action::CurrencySelected(code));
        }
        let operators = self.config.operators()?;
        if !operators.is_empty() {
            actions.push(Action::OperatorsLoaded(operators));
        }

        let changes = self.store.dispatch_all(actions);
        self.store.read(|s| {
            info!(
                wallets = s.account.wallets.len(),
                selected = ?s.account.selected_address().map(Address::as_str),
                alerts = s.alert.alerts.len(),
                operators = s.staking.operators.len(),
                currency = %s.currency.selected,
                "Restored persisted state"
            );
        });
        Ok(changes)
    }

    /// Dispatch `actions`, persist and react until no follow-ups remain.
    ///
    /// With `tx` set, change reports also schedule dependent fetches whose
    /// results come back through the same channel.
    pub fn apply(&self, actions: Vec<Action>, tx: Option<&ActionSender>) -> Changes {
        let mut all = Changes::NONE;
        let mut pending = actions;

        for _ in 0..MAX_FOLLOW_UP_ROUNDS {
            if pending.is_empty() {
                return all;
            }
            let changes = self.store.dispatch_all(pending);
            self.persist(changes);
            self.record_metrics(changes);
            pending = self.react(changes, tx);
            all.merge(changes);
        }

        if !pending.is_empty() {
            warn!(dropped = pending.len(), "Follow-up actions did not settle");
        }
        all
    }

    /// Derived actions for a change report, plus scheduled fetches.
    fn react(&self, changes: Changes, tx: Option<&ActionSender>) -> Vec<Action> {
        let mut follow_up = Vec::new();
        if changes.is_empty() {
            return follow_up;
        }

        if changes.contains(Change::TokensInitialized) {
            let favorites = self.archive.load_favorites();
            if !favorites.is_empty() {
                follow_up.push(Action::FavoritesSet(favorites));
            }
        }
        if changes.contains(Change::Token) {
            follow_up.extend(self.store.read(apr_updates));
        }
        if changes.contains(Change::Token) || changes.contains(Change::Currency) {
            follow_up.extend(self.store.read(|s| self.evaluator.evaluate(s)));
        }

        if let Some(tx) = tx {
            self.schedule_fetches(changes, tx);
        }
        follow_up
    }

    fn schedule_fetches(&self, changes: Changes, tx: &ActionSender) {
        let new_block = changes.contains(Change::NewBlock);
        let wants_balances = new_block
            || changes.contains(Change::WalletSelected)
            || changes.contains(Change::TokensInitialized);
        let wants_staking = changes.contains(Change::OperatorsLoaded);
        if !new_block && !wants_balances && !wants_staking {
            return;
        }

        let (token_state, wallet, operators) = self.store.read(|s| {
            (
                s.token.clone(),
                s.account.selected_address().cloned(),
                s.staking.operators.clone(),
            )
        });

        if new_block {
            let poller = self.poller.clone();
            let current = token_state.clone();
            spawn_fetch("tokens", tx.clone(), async move {
                poller.refresh_tokens(&current).await
            });
        }

        let Some(wallet) = wallet else {
            return;
        };
        let poller = self.poller.clone();
        if wants_balances {
            debug!(%wallet, "Refreshing wallet balances");
            spawn_fetch("balances", tx.clone(), async move {
                poller
                    .refresh_balances(&wallet, &token_state.tokens, &operators)
                    .await
            });
        } else {
            spawn_fetch("staking", tx.clone(), async move {
                poller.refresh_staking(&wallet, &operators).await
            });
        }
    }

    /// Write every initialized slice the report marks changed.
    fn persist(&self, changes: Changes) {
        if changes.is_empty() {
            return;
        }
        self.store.read(|s| {
            let mut results = Vec::new();
            if changes.contains(Change::Account) && s.account.initialized {
                results.push((keys::ACCOUNT, self.archive.save_account(&s.account)));
            }
            if changes.contains(Change::Alert) && s.alert.initialized {
                results.push((keys::ALERTS, self.archive.save_alerts(&s.alert)));
            }
            if changes.contains(Change::Settings) && s.settings.initialized {
                results.push((
                    keys::SETTINGS,
                    self.archive.save_settings(&s.settings),
                ));
            }
            if changes.contains(Change::Notification) && s.notification.initialized {
                results.push((
                    keys::NOTIFICATIONS,
                    self.archive.save_notifications(&s.notification),
                ));
            }
            if changes.contains(Change::Favorites) {
                let favorites: Vec<Address> = s
                    .token
                    .tokens
                    .iter()
                    .filter(|t| t.is_favorited)
                    .map(|t| t.address_bech32.clone())
                    .collect();
                results.push((
                    keys::FAVORITES,
                    self.archive.save_favorites(&favorites),
                ));
            }
            if changes.contains(Change::CurrencySelected) {
                results.push((
                    keys::SELECTED_CURRENCY,
                    self.archive.save_selected_currency(&s.currency.selected),
                ));
            }

            for (slice, result) in results {
                if let Err(e) = result {
                    warn!(slice, error = %e, "Failed to persist state");
                }
            }
        });
    }

    fn record_metrics(&self, changes: Changes) {
        self.store.read(|s| {
            if changes.contains(Change::Account) {
                Metrics::wallet_connected(
                    s.account
                        .selected_wallet
                        .as_ref()
                        .is_some_and(|w| w.is_connected),
                );
            }
            if changes.contains(Change::Token) {
                Metrics::tokens_tracked(s.token.tokens.len());
                Metrics::zil_rate(to_f64(s.token.zil_rate));
            }
            if changes.contains(Change::Token) || changes.contains(Change::Staking) {
                let summary = portfolio_view(s).summary;
                Metrics::portfolio_value(to_f64(summary.total_zil), to_f64(summary.total_usd));
            }
        });
    }

    /// Restore the ZilPay session when the account holds a ZilPay wallet.
    ///
    /// Only the connection flag of the returned address changes; the
    /// selected wallet and the recorded provider stay as they were.
    async fn reconnect(&self) -> Vec<Action> {
        let has_zilpay_wallet = self.store.read(|s| {
            s.account
                .wallets
                .iter()
                .any(|w| matches!(w.kind, ProviderKind::ZilPay))
        });
        if !has_zilpay_wallet {
            return Vec::new();
        }
        if !self.wallets.has_zilpay() {
            debug!("ZilPay wallet stored but no bridge present");
            return Vec::new();
        }
        match self.wallets.reconnect_zilpay().await {
            Ok(connection) => vec![Action::WalletUpdated {
                address: connection.address,
                is_connected: true,
            }],
            Err(e) => {
                warn!(error = %e, "ZilPay reconnect failed");
                Vec::new()
            }
        }
    }

    /// Restore state, request the token list and reconnect ZilPay.
    ///
    /// The token list is fetched once here, independent of block polling.
    async fn start(&self, tx: &ActionSender) -> AppResult<()> {
        let restored = self.restore()?;
        let follow_up = self.react(restored, Some(tx));
        self.apply(follow_up, Some(tx));

        let poller = self.poller.clone();
        let current = self.store.read(|s| s.token.clone());
        spawn_fetch("tokens", tx.clone(), async move {
            poller.refresh_tokens(&current).await
        });

        let reconnected = self.reconnect().await;
        self.apply(reconnected, Some(tx));
        Ok(())
    }

    /// Connect with an injected or session provider and select the wallet.
    pub async fn connect(&self, kind: ProviderKind) -> AppResult<WalletConnection> {
        let connection = self.wallets.connect(kind).await?;
        self.apply(vec![connected(&connection)], None);
        Ok(connection)
    }

    /// Log in with an avatar name and select the wallet.
    pub async fn connect_avatar(&self, name: &str) -> AppResult<WalletConnection> {
        let connection = self.wallets.connect_avatar(name).await?;
        self.apply(vec![connected(&connection)], None);
        Ok(connection)
    }

    /// Forget the selected wallet.
    pub fn disconnect(&self) -> AppResult<Address> {
        let address = self
            .store
            .read(|s| s.account.selected_address().cloned())
            .ok_or(AppError::NoWallet)?;
        self.apply(vec![Action::WalletDisconnected(address.clone())], None);
        info!(%address, "Wallet disconnected");
        Ok(address)
    }

    /// Add a price alert. Creating the first alert grants notification
    /// permission unless it was denied.
    pub fn add_alert(
        &self,
        token: Address,
        metric: Metric,
        indicator: Indicator,
        value: Decimal,
    ) -> Alert {
        let alert = Alert::new(token, metric, indicator, value);
        let mut actions = vec![Action::AlertAdded(alert.clone())];

        let settings = self.store.read(|s| s.settings.clone());
        if matches!(settings.notification_permission, NotificationPermission::Default) {
            actions.push(Action::SettingsUpdated(SettingsState {
                notification_permission: NotificationPermission::Granted,
                ..settings
            }));
        }

        self.apply(actions, None);
        info!(id = %alert.id, alert = %alert, "Alert added");
        alert
    }

    pub fn remove_alert(&self, id: Uuid) -> AppResult<()> {
        self.require_alert(id)?;
        self.apply(vec![Action::AlertRemoved(id)], None);
        Ok(())
    }

    /// Re-arm a triggered alert.
    pub fn reset_alert(&self, id: Uuid) -> AppResult<()> {
        self.require_alert(id)?;
        self.apply(vec![Action::AlertReset(id)], None);
        Ok(())
    }

    fn require_alert(&self, id: Uuid) -> AppResult<()> {
        let known = self
            .store
            .read(|s| s.alert.alerts.iter().any(|a| a.id == id));
        if known {
            Ok(())
        } else {
            Err(AppError::UnknownAlert(id))
        }
    }

    /// Flip the favorite flag of a loaded token.
    pub fn toggle_favorite(&self, token: &Address) -> AppResult<bool> {
        let changes = self.apply(vec![Action::FavoriteToggled(token.clone())], None);
        if !changes.contains(Change::Favorites) {
            return Err(AppError::UnknownToken(token.clone()));
        }
        Ok(self
            .store
            .read(|s| s.token.get(token).is_some_and(|t| t.is_favorited)))
    }

    /// Fetch rates, block height, tokens and the selected wallet's balances
    /// once, without scheduling anything.
    pub async fn refresh_once(&self) {
        let (rates, block) = tokio::join!(
            self.poller.refresh_rates(),
            self.poller.refresh_block_height()
        );
        self.apply(rates.into_iter().chain(block).collect(), None);

        let current = self.store.read(|s| s.token.clone());
        self.apply(self.poller.refresh_tokens(&current).await, None);

        let selection = self.store.read(|s| {
            s.account.selected_address().cloned().map(|wallet| {
                (wallet, s.token.tokens.clone(), s.staking.operators.clone())
            })
        });
        if let Some((wallet, tokens, operators)) = selection {
            let balances = self
                .poller
                .refresh_balances(&wallet, &tokens, &operators)
                .await;
            self.apply(balances, None);
        }
    }

    pub fn view(&self) -> PortfolioView {
        self.store.read(portfolio_view)
    }

    pub fn snapshot(&self) -> RootState {
        self.store.snapshot()
    }

    /// Run until Ctrl-C.
    pub async fn run(self) -> AppResult<()> {
        info!(
            data_dir = %self.config.persistence.data_dir,
            rpc_url = %self.config.endpoints.rpc_url,
            "Starting application"
        );

        let (tx, mut rx) = mpsc::channel::<Vec<Action>>(ACTION_CHANNEL_CAPACITY);

        self.start(&tx).await?;

        let mut scheduler = Scheduler::new();
        let poller = self.poller.clone();
        scheduler.every(
            "rates",
            self.config.intervals.rate_refresh(),
            tx.clone(),
            move || {
                let poller = poller.clone();
                async move { poller.refresh_rates().await }
            },
        );
        let poller = self.poller.clone();
        scheduler.every(
            "block",
            self.config.intervals.block_poll(),
            tx.clone(),
            move || {
                let poller = poller.clone();
                async move { poller.refresh_block_height().await }
            },
        );

        let dashboard_handle = if self.config.dashboard.enabled {
            let state = DashboardState::new(self.store.clone());
            let config = self.config.dashboard.clone();
            Some(tokio::spawn(async move {
                if let Err(e) = run_server(state, config).await {
                    error!(error = %e, "Dashboard server failed");
                }
            }))
        } else {
            None
        };

        info!("Entering dispatch loop");
        let mut batches = 0u64;
        loop {
            tokio::select! {
                Some(actions) = rx.recv() => {
                    batches += 1;
                    self.apply(actions, Some(&tx));
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        info!(batches, "Shutting down");
        scheduler.shutdown();
        drop(tx);

        // Results of fetches already in flight are still applied
        while let Ok(Some(actions)) = tokio::time::timeout(SHUTDOWN_GRACE, rx.recv()).await {
            self.apply(actions, None);
        }

        scheduler.abort();
        if let Some(handle) = dashboard_handle {
            handle.abort();
        }

        Ok(())
    }
}

fn connected(connection: &WalletConnection) -> Action {
    Action::WalletConnected {
        address: connection.address.clone(),
        kind: connection.kind,
        network: connection.network,
    }
}

/// APR updates for tokens whose computed APR differs from the stored one.
fn apr_updates(state: &RootState) -> Vec<Action> {
    state
        .token
        .tokens
        .iter()
        .filter_map(|token| {
            let apr = token_apr(token, &state.token);
            (apr != token.apr).then(|| Action::TokenAprUpdate {
                address: token.address_bech32.clone(),
                apr,
            })
        })
        .collect()
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Run `fetch` in the background and forward non-empty results.
fn spawn_fetch<Fut>(source: &'static str, tx: ActionSender, fetch: Fut)
where
    Fut: Future<Output = Vec<Action>> + Send + 'static,
{
    tokio::spawn(async move {
        let actions = fetch.await;
        if actions.is_empty() {
            return;
        }
        if tx.send(actions).await.is_err() {
            debug!(source, "Dispatch loop closed, dropping fetch results");
        }
    });
}
