// src/common/i18n.rs

use std::collections::HashMap;

// Mensagens de erro traduzidas. O idioma vem do Accept-Language (extrator
// Locale); "pt" é o idioma da casa e serve de fallback.
#[derive(Clone)]
pub struct I18nStore {
    messages: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut pt = HashMap::new();
        pt.insert("validation_error", "Um ou mais campos são inválidos.");
        pt.insert("invalid_amount", "O valor deve ser maior que zero.");
        pt.insert("account_inactive", "A conta bancária está inativa.");
        pt.insert("shift_already_open", "Já existe um caixa aberto para esta loja.");
        pt.insert("shift_not_open", "O caixa não está aberto.");
        pt.insert("missing_reason", "Informe o motivo da movimentação.");
        pt.insert(
            "installment_sum_mismatch",
            "A soma das parcelas não corresponde ao valor total.",
        );
        pt.insert(
            "overpayment_rejected",
            "O pagamento excede o saldo devedor do título.",
        );
        pt.insert(
            "obligation_cancelled",
            "Este título está cancelado e não aceita pagamentos.",
        );
        pt.insert("not_found", "Registro não encontrado.");
        pt.insert(
            "concurrent_modification",
            "O registro foi alterado por outra operação. Tente novamente.",
        );
        pt.insert("database_error", "Ocorreu um erro inesperado.");
        pt.insert("internal_error", "Ocorreu um erro inesperado.");

        let mut en = HashMap::new();
        en.insert("validation_error", "One or more fields are invalid.");
        en.insert("invalid_amount", "Amount must be greater than zero.");
        en.insert("account_inactive", "The bank account is inactive.");
        en.insert("shift_already_open", "A cash register is already open for this store.");
        en.insert("shift_not_open", "The cash register is not open.");
        en.insert("missing_reason", "A reason for the movement is required.");
        en.insert(
            "installment_sum_mismatch",
            "The sum of the installments does not match the total amount.",
        );
        en.insert(
            "overpayment_rejected",
            "The payment exceeds the outstanding balance.",
        );
        en.insert(
            "obligation_cancelled",
            "This title is cancelled and no longer accepts payments.",
        );
        en.insert("not_found", "Record not found.");
        en.insert(
            "concurrent_modification",
            "The record was changed by another operation. Please retry.",
        );
        en.insert("database_error", "An unexpected error occurred.");
        en.insert("internal_error", "An unexpected error occurred.");

        let mut messages = HashMap::new();
        messages.insert("pt", pt);
        messages.insert("en", en);

        Self { messages }
    }

    pub fn message(&self, lang: &str, key: &str) -> String {
        self.messages
            .get(lang)
            .and_then(|m| m.get(key))
            .or_else(|| self.messages.get("pt").and_then(|m| m.get(key)))
            .map(|s| (*s).to_string())
            // Chave desconhecida volta crua: melhor que esconder o erro.
            .unwrap_or_else(|| key.to_string())
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idioma_desconhecido_cai_no_portugues() {
        let store = I18nStore::new();
        assert_eq!(
            store.message("de", "not_found"),
            store.message("pt", "not_found")
        );
    }

    #[test]
    fn chave_desconhecida_volta_crua() {
        let store = I18nStore::new();
        assert_eq!(store.message("pt", "chave_inexistente"), "chave_inexistente");
    }
}
