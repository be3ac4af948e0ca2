//! Telegram bot message handling.
//!
//! Every update goes through the same gate: only permitted usernames are
//! served, PDFs are treated as receipts, text as quick expense entry.
//! Problems with a receipt or an entry are reported back to the sender
//! in the chat; only a failure to reply is an error for the webhook.

use crate::{
    clients::{
        gemini::{GeminiClient, Part},
        telegram::{Document, Message, TelegramClient, Update},
    },
    db::DbPool,
    error::AppError,
    models::vendor::Vendor,
    services::{
        expense_service,
        quick_entry::{self, QuickExpense},
        receipt_ingest,
        receipt_service,
    },
};

/// What a message asks the bot to do.
#[derive(Debug, PartialEq, Eq)]
pub enum MessageKind<'a> {
    Receipt(&'a Document),
    Text(&'a str),
    Unsupported,
}

pub fn classify(message: &Message) -> MessageKind<'_> {
    if let Some(document) = message.pdf_document() {
        return MessageKind::Receipt(document);
    }

    match message.text.as_deref() {
        Some(text) => MessageKind::Text(text),
        None => MessageKind::Unsupported,
    }
}

#[derive(Clone)]
pub struct BotService {
    pool: DbPool,
    telegram: TelegramClient,
    gemini: GeminiClient,
    permitted_users: Vec<String>,
}

impl BotService {
    pub fn new(
        pool: DbPool,
        telegram: TelegramClient,
        gemini: GeminiClient,
        permitted_users: Vec<String>,
    ) -> Self {
        Self {
            pool,
            telegram,
            gemini,
            permitted_users,
        }
    }

    fn is_permitted(&self, username: &str) -> bool {
        self.permitted_users.iter().any(|u| u == username)
    }

    pub async fn handle_update(&self, update: Update) -> Result<(), AppError> {
        let Some(message) = update.message else {
            tracing::debug!(update_id = update.update_id, "Ignoring update without message");
            return Ok(());
        };

        let Some(username) = message
            .sender_username()
            .filter(|u| self.is_permitted(u))
        else {
            tracing::warn!(
                update_id = update.update_id,
                chat_id = message.chat.id,
                username = ?message.sender_username(),
                "Ignoring message from non-permitted user"
            );
            return Ok(());
        };

        match classify(&message) {
            MessageKind::Receipt(document) => {
                self.handle_receipt(message.chat.id, username, document).await
            }
            MessageKind::Text(text) => self.handle_text(message.chat.id, username, text).await,
            MessageKind::Unsupported => {
                self.reply(message.chat.id, "No registered handler for your message")
                    .await
            }
        }
    }

    async fn reply(&self, chat_id: i64, text: &str) -> Result<(), AppError> {
        self.telegram.send_message(chat_id, text).await?;
        Ok(())
    }

    async fn handle_receipt(
        &self,
        chat_id: i64,
        username: &str,
        document: &Document,
    ) -> Result<(), AppError> {
        let file_name = document.file_name.as_deref().unwrap_or("receipt.pdf");
        let vendor = Vendor::from_file_name(document.file_name.as_deref());

        tracing::info!(file_id = %document.file_id, file_name, ?vendor, "Processing receipt");

        let model_text = match self.extract(document, vendor).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, file_name, "Receipt extraction failed");
                return self
                    .reply(chat_id, &format!("❗️ERROR with {file_name} while reading the receipt"))
                    .await;
            }
        };

        let parsed = match receipt_ingest::parse_response(&model_text) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::error!(error = %e, response = %model_text, "Unparseable Gemini response");
                return self
                    .reply(
                        chat_id,
                        "Something went wrong while parsing the response from gemini",
                    )
                    .await;
            }
        };

        if let Err(e) = receipt_ingest::validate_totals(&parsed) {
            tracing::warn!(error = %e, file_name, "Receipt sums not equal");
            return self
                .reply(chat_id, &format!("❗️ERROR with {file_name} while checking sums"))
                .await;
        }

        match receipt_service::insert_parsed_receipt(&self.pool, username, vendor, &parsed).await
        {
            Ok(_) => {
                self.reply(
                    chat_id,
                    &format!("✅ {file_name}. TOTAL PRICE: {} cents", parsed.total_price),
                )
                .await
            }
            Err(e) => {
                tracing::error!(error = %e, file_name, "Failed to store receipt");
                self.reply(chat_id, &format!("❗️SQL ERROR with {file_name}"))
                    .await
            }
        }
    }

    /// Download the PDF and ask the model for its structured content.
    async fn extract(&self, document: &Document, vendor: Option<Vendor>) -> Result<String, AppError> {
        let file_path = self.telegram.get_file(&document.file_id).await?;
        let pdf = self.telegram.download_file(&file_path).await?;

        let parts = [
            Part::text(receipt_ingest::build_prompt(vendor)),
            Part::pdf(&pdf),
        ];

        Ok(self
            .gemini
            .generate_json(&parts, &receipt_ingest::response_schema())
            .await?)
    }

    async fn handle_text(&self, chat_id: i64, username: &str, text: &str) -> Result<(), AppError> {
        let expense = match quick_entry::parse(text) {
            Ok(expense) => expense,
            Err(e) => {
                tracing::info!(error = %e, "Could not parse quick entry");
                return self
                    .reply(chat_id, "❗️ERROR: could not parse the message.")
                    .await;
            }
        };

        let summary = describe(&expense);

        match expense_service::insert_quick_expense(&self.pool, username, &expense).await {
            Ok(inserted) => {
                tracing::info!(expense_id = inserted.expense_id, "Quick expense stored");
                self.reply(chat_id, &format!("✅ {summary}")).await
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to store quick expense");
                self.reply(chat_id, &format!("❗️ERROR with: {summary}")).await
            }
        }
    }
}

/// `name | cents | category` as echoed back to the sender.
fn describe(expense: &QuickExpense) -> String {
    format!(
        "{} | {} cents | {}",
        expense.name,
        expense.amount,
        expense.category.label()
    )
}
