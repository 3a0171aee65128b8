use html_escape::{encode_double_quoted_attribute, encode_text};

pub struct AlertContent<'a> {
    pub name: &'a str,
    pub product_name: &'a str,
    pub product_url: &'a str,
    pub current_price: &'a str,
    pub threshold: &'a str,
    pub recipient: &'a str,
}

pub fn alert_text(content: &AlertContent) -> String {
    format!(
        "The price of {} has fallen below your price threshold!\n\n\
         Current price: {}\nYour price threshold: {}\n\nView product: {}",
        content.product_name, content.current_price, content.threshold, content.product_url
    )
}

pub fn alert_html(content: &AlertContent) -> String {
    let name = encode_text(content.name);
    let product_name = encode_text(content.product_name);
    let current_price = encode_text(content.current_price);
    let threshold = encode_text(content.threshold);
    let product_url = encode_double_quoted_attribute(content.product_url);
    let recipient = encode_text(content.recipient);
    format!(
        r#"<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333; margin: 0; padding: 0; background-color: #f0f0f0;">
    <table cellpadding="0" cellspacing="0" border="0" width="100%" style="background-color: #f0f0f0;">
        <tr>
            <td align="center" style="padding: 20px 0;">
                <table cellpadding="0" cellspacing="0" border="0" width="600" style="background-color: #fff; border: 1px solid #ddd; border-radius: 4px;">
                    <tr>
                        <td style="padding: 40px;">
                            <h1 style="color: #1a5f7a; font-size: 24px; margin: 0 0 20px; text-align: center;">Price Alert</h1>
                            <p style="margin: 0 0 20px;">Dear {name},</p>
                            <p style="margin: 0 0 20px;">Great news! The price of <strong>{product_name}</strong> has dropped below your set threshold.</p>
                            <table cellpadding="10" cellspacing="0" border="0" width="100%" style="background-color: #f8f8f8; border-radius: 4px;">
                                <tr>
                                    <td><strong>Current price:</strong></td>
                                    <td style="text-align: right;"><strong style="color: #1a5f7a; font-size: 18px;">{current_price}</strong></td>
                                </tr>
                                <tr>
                                    <td><strong>Your threshold:</strong></td>
                                    <td style="text-align: right;"><strong style="font-size: 18px;">{threshold}</strong></td>
                                </tr>
                            </table>
                            <p style="margin: 20px 0;">Don't miss this opportunity to save!</p>
                            <table cellpadding="0" cellspacing="0" border="0" width="100%">
                                <tr>
                                    <td align="center" style="padding: 20px 0;">
                                        <a href="{product_url}" style="background-color: #1a5f7a; color: white; padding: 12px 24px; text-decoration: none; font-weight: bold; border-radius: 4px; display: inline-block;">View Product</a>
                                    </td>
                                </tr>
                            </table>
                            <p style="font-size: 12px; text-align: center; color: #666; margin-top: 40px;">
                                This email was sent to: {recipient}<br>
                            </p>
                        </td>
                    </tr>
                </table>
            </td>
        </tr>
    </table>
</body>
</html>
"#
    )
}
