// src/common/documents.rs
//
// Normalização e validação de documentos brasileiros (CPF, CNPJ) e placas.
// As máscaras de exibição ficam no frontend; aqui só interessa o dígito.

use validator::ValidationError;

/// Remove tudo que não for dígito ("123.456.789-09" -> "12345678909").
pub fn only_digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Placa em maiúsculas, sem hífen nem espaços ("abc-1234" -> "ABC1234").
pub fn normalize_plate(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(|c| c.to_uppercase())
        .collect()
}

fn digits_of(raw: &str) -> Vec<u32> {
    raw.chars().filter_map(|c| c.to_digit(10)).collect()
}

// Dígito verificador no esquema módulo 11 usado por CPF e CNPJ
fn check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    let rest = sum % 11;
    if rest < 2 { 0 } else { 11 - rest }
}

pub fn is_valid_cpf(raw: &str) -> bool {
    let digits = digits_of(raw);
    if digits.len() != 11 || digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    let first = check_digit(&digits[..9], &[10, 9, 8, 7, 6, 5, 4, 3, 2]);
    let second = check_digit(&digits[..10], &[11, 10, 9, 8, 7, 6, 5, 4, 3, 2]);

    digits[9] == first && digits[10] == second
}

pub fn is_valid_cnpj(raw: &str) -> bool {
    let digits = digits_of(raw);
    if digits.len() != 14 || digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    let first = check_digit(&digits[..12], &[5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2]);
    let second = check_digit(&digits[..13], &[6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2]);

    digits[12] == first && digits[13] == second
}

/// Aceita o padrão antigo (ABC1234) e o Mercosul (ABC1D23).
pub fn is_valid_plate(raw: &str) -> bool {
    let plate: Vec<char> = normalize_plate(raw).chars().collect();
    if plate.len() != 7 {
        return false;
    }

    plate[..3].iter().all(|c| c.is_ascii_uppercase())
        && plate[3].is_ascii_digit()
        && (plate[4].is_ascii_digit() || plate[4].is_ascii_uppercase())
        && plate[5..].iter().all(|c| c.is_ascii_digit())
}

// --- Adaptadores para `#[validate(custom(function = ...))]` ---

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

pub fn validate_cpf(value: &str) -> Result<(), ValidationError> {
    if is_valid_cpf(value) {
        Ok(())
    } else {
        Err(invalid("cpf", "CPF inválido."))
    }
}

pub fn validate_cnpj(value: &str) -> Result<(), ValidationError> {
    if is_valid_cnpj(value) {
        Ok(())
    } else {
        Err(invalid("cnpj", "CNPJ inválido."))
    }
}

pub fn validate_plate(value: &str) -> Result<(), ValidationError> {
    if is_valid_plate(value) {
        Ok(())
    } else {
        Err(invalid("placa", "Placa inválida (use ABC1234 ou ABC1D23)."))
    }
}
