use flowzi_core::{
    decode_documents, financial_overview, Document, FinancialOverview, OverviewInputs,
    SessionUser, SettingsService, SubscriptionId,
};
use flowzi_domain::{collections, AllocationProfile, Bill, Goal, Transaction, UserSettings};

use crate::notifications::RecomputedSnapshot;

/// Cached snapshots for the signed-in user plus the overview derived from them.
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub user: Option<SessionUser>,
    pub subscriptions: Vec<SubscriptionId>,
    pub transactions: Vec<Transaction>,
    pub goals: Vec<Goal>,
    pub bills: Vec<Bill>,
    pub settings: Option<UserSettings>,
    pub overview: FinancialOverview,
}

impl SessionState {
    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.uid.as_str())
    }

    /// Replaces one cached collection. Unknown collections are ignored.
    pub fn apply(&mut self, collection: &str, documents: Vec<Document>) {
        match collection {
            collections::TRANSACTIONS => {
                self.transactions = decode_documents(collection, documents)
            }
            collections::GOALS => self.goals = decode_documents(collection, documents),
            collections::BILLS => self.bills = decode_documents(collection, documents),
            collections::USERS => {
                self.settings = self
                    .user_id()
                    .and_then(|uid| SettingsService::find(&documents, uid));
            }
            other => tracing::debug!(collection = other, "ignoring snapshot"),
        }
    }

    pub fn recompute(&mut self, profiles: &[AllocationProfile]) -> &FinancialOverview {
        self.overview = financial_overview(&OverviewInputs {
            transactions: &self.transactions,
            goals: &self.goals,
            bills: &self.bills,
            settings: self.settings.as_ref(),
            profiles,
        });
        &self.overview
    }

    pub fn worker_snapshot(&self, source: &'static str) -> RecomputedSnapshot {
        RecomputedSnapshot {
            source,
            goals: self.goals.clone(),
            transactions: self.transactions.clone(),
            progress: self.overview.goals.clone(),
            monthly_income: self.overview.summary.monthly_income,
            has_activity: self.overview.summary.has_activity(),
            preferences: self.overview.preferences.clone(),
        }
    }

    /// Drops everything cached for the previous user and hands back the
    /// subscriptions that still need cancelling.
    pub fn clear(&mut self) -> Vec<SubscriptionId> {
        let subscriptions = std::mem::take(&mut self.subscriptions);
        *self = SessionState::default();
        subscriptions
    }
}
