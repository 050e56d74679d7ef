//! Application services: the operations behind each route.
//!
//! `AppServices` is built once from `AppConfig` and shared as `Arc<AppServices>`.
//! It owns the signing keys, the bcrypt cost and the store handles; nothing here
//! reads global state.

use chrono::Utc;
use serde::Serialize;

use mentorhub_auth::{Hs256Jwt, Role, SessionClaims, hash_password, verify_password};
use mentorhub_core::{
    AccountId, AnswerId, DomainError, Entity, MentorId, QuestionId, not_found_message,
};
use mentorhub_infra::{AnswerFilter, AppConfig, Paged, Pagination, StoreError, Stores};
use mentorhub_mentorship::{
    Account, Answer, Mentee, MenteeRecord, Mentor, MentorProfileUpdate, MentorRecord, NewAccount,
    ProfileId, Question, QuestionUpdate, Vote,
};

use crate::app::dto::{
    ChangePasswordRequest, CreateAnswerRequest, CreateQuestionRequest, LoginRequest,
    RegisterMenteeRequest, RegisterMentorRequest, SessionView,
};
use crate::app::errors::ApiError;
use crate::context::PrincipalContext;

/// An account with whichever profile it owns.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Member {
    Mentor(MentorRecord),
    Mentee(MenteeRecord),
}

pub struct AppServices {
    stores: Stores,
    jwt: Hs256Jwt,
    bcrypt_cost: u32,
}

impl AppServices {
    pub fn new(config: &AppConfig, stores: Stores) -> Self {
        Self {
            stores,
            jwt: Hs256Jwt::new(config.jwt_secret.as_bytes(), config.token_ttl),
            bcrypt_cost: config.bcrypt_cost,
        }
    }

    pub fn jwt(&self) -> &Hs256Jwt {
        &self.jwt
    }

    // -------------------------
    // Credentials
    // -------------------------

    async fn hash(&self, password: String) -> Result<String, ApiError> {
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|e| ApiError::internal(format!("hashing task failed: {e}")))?
            .map_err(ApiError::from)
    }

    async fn verify(&self, password: String, hash: String) -> Result<bool, ApiError> {
        tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| ApiError::internal(format!("verification task failed: {e}")))?
            .map_err(ApiError::from)
    }

    fn issue_token(&self, account: &Account) -> Result<String, ApiError> {
        let token = self.jwt.issue(
            |at, ttl| {
                SessionClaims::new(
                    account.id,
                    account.firstname.as_str(),
                    account.lastname.as_str(),
                    account.account_type,
                    at,
                    ttl,
                )
            },
            Utc::now(),
        )?;
        Ok(token)
    }

    async fn ensure_email_free(&self, email: &str, role: Role) -> Result<(), ApiError> {
        if self.stores.accounts.find_by_email(email).await?.is_some() {
            return Err(already_exists(role));
        }
        Ok(())
    }

    pub async fn register_mentor(
        &self,
        req: RegisterMentorRequest,
    ) -> Result<SessionView<MentorRecord>, ApiError> {
        self.ensure_email_free(&req.email, Role::Mentor).await?;
        let password_hash = self.hash(req.password).await?;

        let now = Utc::now();
        let mut mentor = Mentor::new(req.specialization, req.years_of_experience, now);
        mentor.bio = req.bio;
        let account = Account::register(
            NewAccount {
                firstname: req.firstname,
                lastname: req.lastname,
                email: req.email,
                track: req.track,
                password_hash,
            },
            ProfileId::Mentor(mentor.id),
            now,
        );

        let record = self
            .stores
            .accounts
            .create_mentor(account, mentor)
            .await
            .map_err(|e| registration_error(e, Role::Mentor))?;

        tracing::info!(account_id = %record.account.id, "mentor registered");
        let token = self.issue_token(&record.account)?;
        Ok(SessionView { token, user: record })
    }

    pub async fn register_mentee(
        &self,
        req: RegisterMenteeRequest,
    ) -> Result<SessionView<MenteeRecord>, ApiError> {
        self.ensure_email_free(&req.email, Role::Mentee).await?;
        let password_hash = self.hash(req.password).await?;

        let now = Utc::now();
        let mentee = Mentee::new(now);
        let account = Account::register(
            NewAccount {
                firstname: req.firstname,
                lastname: req.lastname,
                email: req.email,
                track: req.track,
                password_hash,
            },
            ProfileId::Mentee(mentee.id),
            now,
        );

        let record = self
            .stores
            .accounts
            .create_mentee(account, mentee)
            .await
            .map_err(|e| registration_error(e, Role::Mentee))?;

        tracing::info!(account_id = %record.account.id, "mentee registered");
        let token = self.issue_token(&record.account)?;
        Ok(SessionView { token, user: record })
    }

    pub async fn login(&self, req: LoginRequest) -> Result<SessionView<Member>, ApiError> {
        let account = self
            .stores
            .accounts
            .find_by_email(&req.email)
            .await?
            .ok_or_else(|| DomainError::not_found(not_found_message::<Account>()))?;

        if !self.verify(req.password, account.password_hash.clone()).await? {
            tracing::warn!(account_id = %account.id, "login with wrong password");
            return Err(DomainError::InvalidCredential.into());
        }

        let token = self.issue_token(&account)?;
        let user = self.member(account).await?;
        Ok(SessionView { token, user })
    }

    async fn member(&self, account: Account) -> Result<Member, ApiError> {
        let member = match account.owner {
            ProfileId::Mentor(id) => self.stores.accounts.get_mentor(id).await?.map(Member::Mentor),
            ProfileId::Mentee(id) => self.stores.accounts.get_mentee(id).await?.map(Member::Mentee),
        };
        member.ok_or_else(|| {
            ApiError::internal(format!("account {} has no {} profile", account.id, account.account_type))
        })
    }

    async fn account(&self, id: AccountId) -> Result<Account, ApiError> {
        self.stores
            .accounts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(not_found_message::<Account>()).into())
    }

    /// The caller's account and profile.
    pub async fn me(&self, principal: &PrincipalContext) -> Result<Member, ApiError> {
        let account = self.account(principal.account_id()).await?;
        self.member(account).await
    }

    pub async fn change_password(
        &self,
        principal: &PrincipalContext,
        req: ChangePasswordRequest,
    ) -> Result<(), ApiError> {
        let mut account = self.account(principal.account_id()).await?;

        if !self.verify(req.old_password, account.password_hash.clone()).await? {
            tracing::warn!(account_id = %account.id, "password change with wrong old password");
            return Err(DomainError::unauthorized("Old password is incorrect").into());
        }

        let hash = self.hash(req.new_password).await?;
        account.set_password_hash(hash, Utc::now());
        self.stores.accounts.update_account(&account).await?;
        tracing::info!(account_id = %account.id, "password changed");
        Ok(())
    }

    // -------------------------
    // Mentors
    // -------------------------

    pub async fn list_mentors(&self, page: Pagination) -> Result<Paged<MentorRecord>, ApiError> {
        Ok(self.stores.accounts.list_mentors(page).await?)
    }

    pub async fn get_mentor(&self, id: MentorId) -> Result<MentorRecord, ApiError> {
        self.stores
            .accounts
            .get_mentor(id)
            .await?
            .ok_or_else(|| DomainError::not_found(not_found_message::<Mentor>()).into())
    }

    pub async fn update_mentor_profile(
        &self,
        principal: &PrincipalContext,
        update: MentorProfileUpdate,
    ) -> Result<MentorRecord, ApiError> {
        if principal.role() != Role::Mentor {
            return Err(DomainError::forbidden("Only mentors can update a mentor profile").into());
        }
        if update.is_empty() {
            return Err(DomainError::validation("At least one field must be provided").into());
        }

        let account = self.account(principal.account_id()).await?;
        let mentor_id = account
            .mentor_id()
            .ok_or_else(|| DomainError::forbidden("Only mentors can update a mentor profile"))?;
        let mut record = self.get_mentor(mentor_id).await?;

        record.apply(&update, Utc::now());
        self.stores.accounts.update_mentor(&record).await?;
        Ok(record)
    }

    // -------------------------
    // Questions
    // -------------------------

    pub async fn create_question(
        &self,
        principal: &PrincipalContext,
        req: CreateQuestionRequest,
    ) -> Result<Question, ApiError> {
        let question = Question::new(principal.account_id(), req.title, req.body, req.tags, Utc::now());
        self.stores.questions.insert_question(&question).await?;
        Ok(question)
    }

    pub async fn get_question(&self, id: QuestionId) -> Result<Question, ApiError> {
        self.stores
            .questions
            .get_question(id)
            .await?
            .ok_or_else(|| DomainError::not_found(not_found_message::<Question>()).into())
    }

    pub async fn update_question(
        &self,
        principal: &PrincipalContext,
        id: QuestionId,
        update: QuestionUpdate,
    ) -> Result<Question, ApiError> {
        if update == QuestionUpdate::default() {
            return Err(DomainError::validation("At least one field must be provided").into());
        }
        let mut question = self.get_question(id).await?;
        ensure_author::<Question>(question.is_authored_by(principal.account_id()))?;

        question.apply(update, Utc::now());
        self.stores.questions.update_question(&question).await?;
        Ok(question)
    }

    pub async fn list_questions(&self, page: Pagination) -> Result<Paged<Question>, ApiError> {
        Ok(self.stores.questions.list_questions(page).await?)
    }

    // -------------------------
    // Answers
    // -------------------------

    pub async fn create_answer(
        &self,
        principal: &PrincipalContext,
        req: CreateAnswerRequest,
    ) -> Result<Answer, ApiError> {
        let question = self.get_question(req.question_id).await?;
        let answer = Answer::new(question.id, principal.account_id(), req.body, Utc::now());
        self.stores.answers.insert_answer(&answer).await?;
        Ok(answer)
    }

    pub async fn get_answer(&self, id: AnswerId) -> Result<Answer, ApiError> {
        self.stores
            .answers
            .get_answer(id)
            .await?
            .ok_or_else(|| DomainError::not_found(not_found_message::<Answer>()).into())
    }

    pub async fn update_answer(
        &self,
        principal: &PrincipalContext,
        id: AnswerId,
        body: String,
    ) -> Result<Answer, ApiError> {
        let mut answer = self.get_answer(id).await?;
        ensure_author::<Answer>(answer.is_authored_by(principal.account_id()))?;

        answer.edit(body, Utc::now());
        self.stores.answers.update_answer(&answer).await?;
        Ok(answer)
    }

    pub async fn list_answers(
        &self,
        filter: AnswerFilter,
        page: Pagination,
    ) -> Result<Paged<Answer>, ApiError> {
        Ok(self.stores.answers.list_answers(filter, page).await?)
    }

    pub async fn vote(&self, id: AnswerId, vote: Vote) -> Result<Answer, ApiError> {
        self.stores
            .answers
            .vote(id, vote)
            .await?
            .ok_or_else(|| DomainError::not_found(not_found_message::<Answer>()).into())
    }
}

fn already_exists(role: Role) -> ApiError {
    DomainError::conflict(format!("{role} already exists!")).into()
}

/// A duplicate caught by the store reports the same 409 as the pre-check.
fn registration_error(err: StoreError, role: Role) -> ApiError {
    match err {
        StoreError::DuplicateEmail(_) => already_exists(role),
        other => other.into(),
    }
}

fn ensure_author<E: Entity>(is_author: bool) -> Result<(), ApiError> {
    if is_author {
        Ok(())
    } else {
        Err(DomainError::forbidden(format!("Only the author can edit this {}", E::KIND.to_lowercase())).into())
    }
}
